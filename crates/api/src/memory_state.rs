// Path: crates/api/src/memory_state.rs
//! The in-memory `StateAccess` reference adapter (§6): a `BTreeMap` behind a
//! `parking_lot::RwLock`, used by every unit test in this workspace and
//! suitable as the default backend for a single-process demo. A real disk
//! engine is an external collaborator satisfying the same `StateAccess`
//! trait (§1 Non-goals: no recovery from persistent storage corruption).

use crate::state::{StateAccess, StateScanIter};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use sumeragi_types::error::StateError;

#[derive(Default)]
pub struct InMemoryState {
    rows: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateAccess for InMemoryState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.rows.read().get(key).cloned())
    }

    fn insert(&self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.rows.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StateError> {
        self.rows.write().remove(key);
        Ok(())
    }

    fn batch_apply(&self, inserts: &[(Vec<u8>, Vec<u8>)], deletes: &[Vec<u8>]) -> Result<(), StateError> {
        let mut rows = self.rows.write();
        for key in deletes {
            rows.remove(key);
        }
        for (key, value) in inserts {
            rows.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let matches: Vec<_> = self
            .rows
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(matches.into_iter()))
    }
}
