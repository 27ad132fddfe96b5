// Path: crates/api/src/validator.rs
//! The command validator contract (§4.2): `hasPermissions` and `isValid`,
//! pure functions over borrowed world-state snapshots, wrapped by a thin
//! stateful gate the consensus commit path calls before execution.

use async_trait::async_trait;
use sumeragi_types::error::TransactionError;
use sumeragi_types::ids::PublicKeyBytes;
use sumeragi_types::model::Command;

/// Both gates — permission and stateful feasibility — must pass before
/// execution (§4.2). Validation never mutates the world state.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate_all(&self, commands: &[Command], creator: &PublicKeyBytes) -> Result<(), TransactionError>;
}
