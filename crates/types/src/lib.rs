// Path: crates/types/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! Core data structures, error taxonomy, canonical codec, and configuration
//! shared by every crate in the Sumeragi core.

pub mod codec;
pub mod config;
pub mod error;
pub mod ids;
pub mod keys;
pub mod model;

pub use ids::{AccountId, AssetId, DomainId, MerkleRootHash, PublicKeyBytes, RoleId, SignatureBytes, TxHash};
pub use model::*;
