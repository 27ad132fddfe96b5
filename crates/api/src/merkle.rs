// Path: crates/api/src/merkle.rs
//! The Merkle transaction repository contract (§4.4): a binary tree indexed
//! by monotonic leaf order, content-addressed by node hash, and persisted
//! through the same [`crate::state::StateAccess`] contract as world-state
//! rows under a distinct key prefix (§3, Ownership).

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sumeragi_types::error::StateError;
use sumeragi_types::ids::{MerkleRootHash, TxHash};
use sumeragi_types::model::Transaction;

/// A persisted Merkle node. Leaves have `left_child_hash`/`right_child_hash`
/// both `None`; internal nodes have both `Some`. `parent_hash` is filled in
/// once this node is adopted as a child of a newer node; the root's is
/// always `None`.
#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct MerkleNodeRecord {
    pub hash: MerkleRootHash,
    pub parent_hash: Option<MerkleRootHash>,
    pub left_child_hash: Option<MerkleRootHash>,
    pub right_child_hash: Option<MerkleRootHash>,
}

/// Writes are serialized behind the world-state write lock (§5); the trait
/// itself stays synchronous so a commit path can call it without crossing
/// an await point while holding that lock.
pub trait MerkleRepository: Send + Sync {
    /// Appends `tx` as the next leaf, returning the new root. If the
    /// previous rightmost parent has an empty right slot it is installed
    /// there; otherwise a fresh right-leaning subtree is rooted above the
    /// previous root (§4.4).
    fn append(&self, tx: &Transaction) -> Result<MerkleRootHash, StateError>;

    fn contains(&self, tx_hash: &TxHash) -> Result<bool, StateError>;

    fn root(&self) -> Result<Option<MerkleRootHash>, StateError>;

    fn get_leaf(&self, tx_hash: &TxHash) -> Result<Option<Transaction>, StateError>;
}
