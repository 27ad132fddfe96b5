// Path: crates/crypto/src/lib.rs
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
//! Cryptographic primitives for the Sumeragi core, consumed as pure
//! functions (§6): Ed25519 signing, SHA3-256 hashing, Base64 encoding.

pub mod encoding;
pub mod hash;
pub mod sign;

pub use encoding::{base64_decode, base64_encode};
pub use hash::sha3_256;
pub use sign::{sign, verify, Ed25519KeyPair};
