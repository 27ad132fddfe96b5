// Path: crates/crypto/src/hash.rs
//! SHA3-256 hashing (§6), following the `HashFunction`-trait-plus-free-
//! function convention used throughout this codebase for cryptographic
//! primitives: a plain function for call sites that just want a digest, and
//! a small trait object for call sites that need to plug in a hash function
//! generically.

use sha3::{Digest, Sha3_256 as Sha3_256Impl};
use sumeragi_types::{Transaction, TxHash};

/// A pluggable hash function, in case a future commitment scheme needs to
/// swap the digest algorithm without touching every call site.
pub trait HashFunction: Send + Sync {
    fn digest_size(&self) -> usize;
    fn name(&self) -> &'static str;
    fn hash(&self, data: &[u8]) -> Vec<u8>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha3_256;

impl HashFunction for Sha3_256 {
    fn digest_size(&self) -> usize {
        32
    }

    fn name(&self) -> &'static str {
        "sha3-256"
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha3_256(data).to_vec()
    }
}

/// `SHA3-256(bytes)` (§6).
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256Impl::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Leaf hash = `SHA3-256(canonical_serialize(tx))` (§4.4).
pub fn tx_hash(tx: &Transaction) -> TxHash {
    TxHash(sha3_256(&tx.signing_payload()))
}

/// Internal node hash = `SHA3-256(left_child_hash || right_child_hash)`
/// (§4.4).
pub fn merkle_internal_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(left);
    buf.extend_from_slice(right);
    sha3_256(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(sha3_256(b"sumeragi"), sha3_256(b"sumeragi"));
        assert_ne!(sha3_256(b"sumeragi"), sha3_256(b"iroha"));
    }

    #[test]
    fn trait_object_matches_free_function() {
        let hasher: Box<dyn HashFunction> = Box::new(Sha3_256);
        assert_eq!(hasher.hash(b"x"), sha3_256(b"x").to_vec());
        assert_eq!(hasher.digest_size(), 32);
    }
}
