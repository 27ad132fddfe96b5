// Path: crates/storage/src/merkle_tree.rs
//! A content-addressed, right-leaning binary Merkle tree (§4.4) over any
//! [`StateAccess`] backend, sharing that store with the world state under a
//! distinct key prefix (§3, Ownership).
//!
//! Nodes are immutable once written: a node's hash is always a function of
//! its children (or, for a leaf, of the transaction it carries), so
//! "filling a node's empty right slot" cannot mean mutating that node in
//! place without changing its own identity. Both cases described in §4.4
//! therefore resolve to the same operation here: wrap the current root and
//! the new leaf under a freshly hashed parent. Only `parent_hash`, which is
//! bookkeeping rather than part of a node's hash, is ever updated in place.

use sumeragi_api::merkle::{MerkleNodeRecord, MerkleRepository};
use sumeragi_api::state::StateAccess;
use sumeragi_crypto::hash::{merkle_internal_hash, tx_hash};
use sumeragi_types::codec::{from_bytes_canonical, to_bytes_canonical};
use sumeragi_types::error::StateError;
use sumeragi_types::ids::{MerkleRootHash, TxHash};
use sumeragi_types::keys::{merkle_leaf_key, merkle_node_key, MERKLE_ROOT_KEY};
use sumeragi_types::model::Transaction;
use std::sync::Arc;

pub struct MerkleTree {
    state: Arc<dyn StateAccess>,
}

impl MerkleTree {
    pub fn new(state: Arc<dyn StateAccess>) -> Self {
        Self { state }
    }

    fn load_node(&self, hash: &MerkleRootHash) -> Result<Option<MerkleNodeRecord>, StateError> {
        match self.state.get(&merkle_node_key(&hash.to_hex()))? {
            None => Ok(None),
            Some(bytes) => from_bytes_canonical(&bytes).map(Some).map_err(StateError::InvalidValue),
        }
    }

    fn store_node(&self, record: &MerkleNodeRecord) -> Result<(), StateError> {
        let bytes = to_bytes_canonical(record).map_err(StateError::InvalidValue)?;
        self.state.insert(&merkle_node_key(&record.hash.to_hex()), &bytes)
    }

    fn load_root(&self) -> Result<Option<MerkleRootHash>, StateError> {
        match self.state.get(MERKLE_ROOT_KEY)? {
            None => Ok(None),
            Some(bytes) => decode_hash(&bytes).map(Some),
        }
    }

    fn store_root(&self, hash: &MerkleRootHash) -> Result<(), StateError> {
        self.state.insert(MERKLE_ROOT_KEY, hash.as_bytes())
    }
}

fn decode_hash(bytes: &[u8]) -> Result<MerkleRootHash, StateError> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| StateError::InvalidValue("corrupt merkle root record".to_string()))?;
    Ok(MerkleRootHash(arr))
}

impl MerkleRepository for MerkleTree {
    fn append(&self, tx: &Transaction) -> Result<MerkleRootHash, StateError> {
        let leaf_hash = MerkleRootHash(tx_hash(tx).0);

        let tx_bytes = to_bytes_canonical(tx).map_err(StateError::InvalidValue)?;
        self.state.insert(&merkle_leaf_key(&leaf_hash.to_hex()), &tx_bytes)?;

        let mut leaf_record = MerkleNodeRecord {
            hash: leaf_hash,
            parent_hash: None,
            left_child_hash: None,
            right_child_hash: None,
        };
        self.store_node(&leaf_record)?;

        let new_root = match self.load_root()? {
            None => leaf_hash,
            Some(old_root) => {
                let new_hash = MerkleRootHash(merkle_internal_hash(old_root.as_bytes(), leaf_hash.as_bytes()));
                let new_node = MerkleNodeRecord {
                    hash: new_hash,
                    parent_hash: None,
                    left_child_hash: Some(old_root),
                    right_child_hash: Some(leaf_hash),
                };
                self.store_node(&new_node)?;

                if let Some(mut old_root_record) = self.load_node(&old_root)? {
                    old_root_record.parent_hash = Some(new_hash);
                    self.store_node(&old_root_record)?;
                }

                leaf_record.parent_hash = Some(new_hash);
                self.store_node(&leaf_record)?;

                new_hash
            }
        };

        self.store_root(&new_root)?;
        Ok(new_root)
    }

    fn contains(&self, tx_hash: &TxHash) -> Result<bool, StateError> {
        let key = merkle_leaf_key(&MerkleRootHash(tx_hash.0).to_hex());
        Ok(self.state.get(&key)?.is_some())
    }

    fn root(&self) -> Result<Option<MerkleRootHash>, StateError> {
        self.load_root()
    }

    fn get_leaf(&self, tx_hash: &TxHash) -> Result<Option<Transaction>, StateError> {
        let key = merkle_leaf_key(&MerkleRootHash(tx_hash.0).to_hex());
        match self.state.get(&key)? {
            None => Ok(None),
            Some(bytes) => from_bytes_canonical(&bytes).map(Some).map_err(StateError::InvalidValue),
        }
    }
}
