// Path: crates/api/src/executor.rs
//! The command executor contract (§4.3): a deterministic, all-or-nothing
//! state transition over the world state.

use async_trait::async_trait;
use sumeragi_types::error::TransactionError;
use sumeragi_types::ids::PublicKeyBytes;
use sumeragi_types::model::Command;

/// Runs every command in array order; a failure at command *i* must leave
/// the underlying store exactly as it was before `execute_all` was called
/// (§4.3 staged-write overlay).
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute_all(&self, commands: &[Command], creator: &PublicKeyBytes) -> Result<(), TransactionError>;
}
