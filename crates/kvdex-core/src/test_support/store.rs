use crate::db::{FieldMap, MemoryStore, Store, StoreError, StructureKind};
use std::{cell::Cell, collections::BTreeSet};

///
/// FaultyStore
///
/// Memory store that answers `budget` calls and then reports itself unavailable.
///

pub(crate) struct FaultyStore {
    inner: MemoryStore,
    budget: Cell<usize>,
}

impl FaultyStore {
    pub(crate) fn new(budget: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            budget: Cell::new(budget),
        }
    }

    pub(crate) const fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Allow `budget` more calls.
    pub(crate) fn refill(&self, budget: usize) {
        self.budget.set(budget);
    }

    fn spend(&self) -> Result<(), StoreError> {
        match self.budget.get() {
            0 => Err(StoreError::unavailable("connection refused")),
            n => {
                self.budget.set(n - 1);
                Ok(())
            }
        }
    }
}

impl Store for FaultyStore {
    fn put_row(&self, key: &str, row: &FieldMap) -> Result<(), StoreError> {
        self.spend()?;
        self.inner.put_row(key, row)
    }

    fn get_row(&self, key: &str) -> Result<Option<FieldMap>, StoreError> {
        self.spend()?;
        self.inner.get_row(key)
    }

    fn delete_row(&self, key: &str) -> Result<bool, StoreError> {
        self.spend()?;
        self.inner.delete_row(key)
    }

    fn set_add(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        self.spend()?;
        self.inner.set_add(set, member)
    }

    fn set_remove(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        self.spend()?;
        self.inner.set_remove(set, member)
    }

    fn set_members(&self, set: &str) -> Result<BTreeSet<String>, StoreError> {
        self.spend()?;
        self.inner.set_members(set)
    }

    fn zset_upsert(&self, zset: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.spend()?;
        self.inner.zset_upsert(zset, member, score)
    }

    fn zset_remove(&self, zset: &str, member: &str) -> Result<bool, StoreError> {
        self.spend()?;
        self.inner.zset_remove(zset, member)
    }

    fn zset_range(
        &self,
        zset: &str,
        low: f64,
        high: f64,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        self.spend()?;
        self.inner.zset_range(zset, low, high)
    }

    fn scan_prefix(&self, prefix: &str, kind: StructureKind) -> Result<Vec<String>, StoreError> {
        self.spend()?;
        self.inner.scan_prefix(prefix, kind)
    }
}
