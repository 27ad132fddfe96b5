// Path: crates/tx/src/staged.rs
//! The all-or-nothing staged-write overlay (§4.3): the executor accumulates
//! writes and deletes in memory, keyed against a snapshot of the rows it
//! read, and only calls [`StateAccess::batch_apply`] once every command in
//! the transaction has executed without error.

use std::collections::{BTreeMap, BTreeSet};
use sumeragi_api::state::StateAccess;
use sumeragi_types::error::StateError;

pub struct StagedWrite<'a> {
    state: &'a dyn StateAccess,
    inserts: BTreeMap<Vec<u8>, Vec<u8>>,
    deletes: BTreeSet<Vec<u8>>,
}

impl<'a> StagedWrite<'a> {
    pub fn new(state: &'a dyn StateAccess) -> Self {
        Self {
            state,
            inserts: BTreeMap::new(),
            deletes: BTreeSet::new(),
        }
    }

    /// Reads through the staged overlay first, falling back to the
    /// underlying store for rows this batch hasn't touched.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        if self.deletes.contains(key) {
            return Ok(None);
        }
        if let Some(value) = self.inserts.get(key) {
            return Ok(Some(value.clone()));
        }
        self.state.get(key)
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.deletes.remove(&key);
        self.inserts.insert(key, value);
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.inserts.remove(&key);
        self.deletes.insert(key);
    }

    /// Flushes the batch to the underlying store. A command that failed
    /// before this point never reaches here; its caller simply drops the
    /// `StagedWrite` instead, leaving the store untouched.
    pub fn commit(self) -> Result<(), StateError> {
        let inserts: Vec<(Vec<u8>, Vec<u8>)> = self.inserts.into_iter().collect();
        let deletes: Vec<Vec<u8>> = self.deletes.into_iter().collect();
        self.state.batch_apply(&inserts, &deletes).map_err(|e| {
            tracing::error!(target: "sumeragi::tx", event = "batch_apply_failed", error = %e);
            e
        })
    }
}

/// A `StateAccess`-shaped view over a `StagedWrite`, so the `rows` helpers
/// (written against `&dyn StateAccess`) work unchanged against either a
/// live store or an in-flight batch.
pub struct StagedView<'a, 'b> {
    pub staged: std::cell::RefCell<&'b mut StagedWrite<'a>>,
}

impl<'a, 'b> StagedView<'a, 'b> {
    pub fn new(staged: &'b mut StagedWrite<'a>) -> Self {
        Self {
            staged: std::cell::RefCell::new(staged),
        }
    }
}

impl<'a, 'b> StateAccess for StagedView<'a, 'b> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.staged.borrow().get(key)
    }

    fn insert(&self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.staged.borrow_mut().put(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StateError> {
        self.staged.borrow_mut().delete(key.to_vec());
        Ok(())
    }

    fn batch_apply(&self, inserts: &[(Vec<u8>, Vec<u8>)], deletes: &[Vec<u8>]) -> Result<(), StateError> {
        let mut staged = self.staged.borrow_mut();
        for key in deletes {
            staged.delete(key.clone());
        }
        for (key, value) in inserts {
            staged.put(key.clone(), value.clone());
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<sumeragi_api::state::StateScanIter<'_>, StateError> {
        // Executor commands in this codebase never rely on a staged-aware
        // prefix scan; only `rows::signatory_referenced_elsewhere` does,
        // and it runs before the command's own writes are staged.
        self.staged.borrow().state.prefix_scan(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumeragi_api::memory_state::InMemoryState;

    #[test]
    fn staged_writes_are_invisible_until_commit() {
        let underlying = InMemoryState::new();
        underlying.insert(b"k", b"old").expect("seed");
        let mut staged = StagedWrite::new(&underlying);
        staged.put(b"k".to_vec(), b"new".to_vec());
        assert_eq!(staged.get(b"k").expect("get"), Some(b"new".to_vec()));
        assert_eq!(underlying.get(b"k").expect("get"), Some(b"old".to_vec()));
        staged.commit().expect("commit");
        assert_eq!(underlying.get(b"k").expect("get"), Some(b"new".to_vec()));
    }

    #[test]
    fn dropping_a_staged_write_leaves_the_store_untouched() {
        let underlying = InMemoryState::new();
        underlying.insert(b"k", b"old").expect("seed");
        {
            let mut staged = StagedWrite::new(&underlying);
            staged.put(b"k".to_vec(), b"new".to_vec());
            // simulate a mid-transaction failure: staged is dropped, never committed
        }
        assert_eq!(underlying.get(b"k").expect("get"), Some(b"old".to_vec()));
    }
}
