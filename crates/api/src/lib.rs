// Path: crates/api/src/lib.rs
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
//! Core traits and shared scaffolding for the Sumeragi core.
//!
//! - [`state::StateAccess`]: the persistent key/value storage contract (§6).
//! - [`transport::Transport`]: the wire transport contract (§6).
//! - [`merkle::MerkleRepository`]: the Merkle transaction repository
//!   contract (§4.4).
//! - [`validator::Validator`] / [`executor::Executor`]: the command
//!   validation/execution contracts (§4.2, §4.3).
//! - [`peer_directory::PeerDirectory`]: the RCU peer directory (§4.5).
//! - [`memory_state::InMemoryState`]: the in-memory `StateAccess` reference
//!   adapter used by every unit test in this workspace (§6).

pub mod executor;
pub mod memory_state;
pub mod merkle;
pub mod peer_directory;
pub mod state;
pub mod transport;
pub mod validator;

pub use executor::Executor;
pub use memory_state::InMemoryState;
pub use merkle::MerkleRepository;
pub use peer_directory::PeerDirectory;
pub use state::{StateAccess, StateKVPair, StateScanIter};
pub use transport::{MessageKind, Transport};
pub use validator::Validator;
