// Path: crates/api/src/state.rs
//! The persistent storage contract (§6): `put`, `get`, `delete`,
//! `prefix_scan`, and an atomic batch abstraction. Expressed as a dyn-safe
//! trait so the hard core never depends on a concrete storage engine; a
//! real disk engine is an external collaborator satisfying this trait.

use sumeragi_types::error::StateError;

pub type StateKVPair = (Vec<u8>, Vec<u8>);
pub type StateScanIter<'a> = Box<dyn Iterator<Item = StateKVPair> + 'a>;

pub trait StateAccess: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;
    fn insert(&self, key: &[u8], value: &[u8]) -> Result<(), StateError>;
    fn delete(&self, key: &[u8]) -> Result<(), StateError>;

    fn batch_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>, StateError> {
        keys.iter().map(|k| self.get(k)).collect()
    }

    /// Atomically applies a batch of inserts/updates and deletes. This is
    /// the primary method the executor (§4.3) uses to commit a
    /// transaction's effects all-or-nothing.
    fn batch_apply(&self, inserts: &[(Vec<u8>, Vec<u8>)], deletes: &[Vec<u8>]) -> Result<(), StateError>;

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError>;
}

impl<T: StateAccess + ?Sized> StateAccess for std::sync::Arc<T> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        (**self).get(key)
    }
    fn insert(&self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        (**self).insert(key, value)
    }
    fn delete(&self, key: &[u8]) -> Result<(), StateError> {
        (**self).delete(key)
    }
    fn batch_apply(&self, inserts: &[(Vec<u8>, Vec<u8>)], deletes: &[Vec<u8>]) -> Result<(), StateError> {
        (**self).batch_apply(inserts, deletes)
    }
    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        (**self).prefix_scan(prefix)
    }
}
