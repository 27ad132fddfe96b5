// Path: crates/consensus/src/lib.rs
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
//! The Sumeragi chain-ordering BFT consensus engine (§4.1).
//!
//! - [`engine::SumeragiEngine`]: role computation, event lifecycle, commit
//!   path, and panic/reconfiguration.
//! - [`worker_pool`]: the bounded event-intake worker pool (§5.1).
//! - [`timer`]: the single-task panic-timer subsystem (§5.1).

pub mod engine;
pub mod timer;
pub mod worker_pool;

pub use engine::{EngineHandle, SumeragiEngine};
pub use timer::PanicTimers;
pub use worker_pool::WorkerPool;
