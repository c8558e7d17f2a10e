//! In-memory store: a single exclusive mutex serializes all transactions.
//!
//! Mirrors the teacher's `storage::memory::StealthDepositStore` (`Arc<RwLock<...>>`
//! guarding a couple of `HashMap` indexes), adapted to the blocking `Mutex` the core
//! engine's synchronous transaction model calls for.
//!
//! `exec_tx` stages writes against a clone of the guarded state and only
//! swaps it back in on success, so a body that returns `Err` partway through
//! leaves the store exactly as it found it — matching `SqliteStore`, where a
//! failed body drops the `rusqlite::Transaction` without committing.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Store, StoreResult, Transaction};
use crate::hash::Hash;

#[derive(Default, Clone)]
struct MemoryState {
    /// key -> (epoch -> hash)
    values: HashMap<String, HashMap<u64, Hash>>,
    epoch_by_root: HashMap<String, u64>,
    root_by_epoch: HashMap<u64, Hash>,
    current_epoch: u64,
}

/// In-memory backend for testing and development. Data is lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

struct MemoryTransaction<'a> {
    state: &'a mut MemoryState,
}

impl Transaction for MemoryTransaction<'_> {
    fn get_value(&mut self, key: &str, max_epoch: u64) -> StoreResult<Option<Hash>> {
        let versions = match self.state.values.get(key) {
            Some(v) => v,
            None => return Ok(None),
        };

        let latest = versions
            .iter()
            .filter(|(epoch, _)| **epoch <= max_epoch)
            .max_by_key(|(epoch, _)| **epoch)
            .map(|(_, hash)| *hash);

        Ok(latest)
    }

    fn set_value(&mut self, key: &str, value: Hash) -> StoreResult<()> {
        let epoch = self.state.current_epoch;
        self.state
            .values
            .entry(key.to_string())
            .or_default()
            .insert(epoch, value);
        Ok(())
    }

    fn current_epoch(&mut self) -> StoreResult<u64> {
        Ok(self.state.current_epoch)
    }

    fn commit_root(&mut self, root: &Hash) -> StoreResult<()> {
        let epoch = self.state.current_epoch;
        self.state.root_by_epoch.insert(epoch, *root);
        self.state.epoch_by_root.insert(root.hex(), epoch);
        self.state.current_epoch += 1;
        Ok(())
    }

    fn epoch_by_root(&mut self, root: &Hash) -> StoreResult<u64> {
        Ok(self
            .state
            .epoch_by_root
            .get(&root.hex())
            .copied()
            .unwrap_or(0))
    }

    fn root_by_epoch(&mut self, epoch: u64) -> StoreResult<Option<Hash>> {
        Ok(self.state.root_by_epoch.get(&epoch).copied())
    }
}

impl Store for MemoryStore {
    fn exec_tx<R>(
        &self,
        body: impl FnOnce(&mut dyn Transaction) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut guard = self.state.lock().expect("memory store mutex poisoned");
        let mut staged = guard.clone();
        let mut tx = MemoryTransaction { state: &mut staged };
        let result = body(&mut tx)?;
        *guard = staged;
        Ok(result)
    }
}
