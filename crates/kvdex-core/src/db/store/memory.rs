use crate::db::{
    FieldMap,
    store::{Store, StoreError, StructureKind},
};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

///
/// MemoryStore
///
/// In-process store backed by ordered maps. Every call takes the lock for
/// exactly one command, so multi-command operations interleave freely.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: BTreeMap<String, FieldMap>,
    sets: BTreeMap<String, BTreeSet<String>>,
    zsets: BTreeMap<String, SortedSet>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings.
    pub fn row_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.rows.len())
    }

    /// Number of non-empty sets.
    pub fn set_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.sets.len())
    }

    /// Number of non-empty sorted sets.
    pub fn zset_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.zsets.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
    }
}

impl Store for MemoryStore {
    fn put_row(&self, key: &str, row: &FieldMap) -> Result<(), StoreError> {
        self.write()?.rows.insert(key.to_string(), row.clone());

        Ok(())
    }

    fn get_row(&self, key: &str) -> Result<Option<FieldMap>, StoreError> {
        Ok(self.read()?.rows.get(key).cloned())
    }

    fn delete_row(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.write()?.rows.remove(key).is_some())
    }

    fn set_add(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        let mut state = self.write()?;

        Ok(state
            .sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    fn set_remove(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let Some(members) = state.sets.get_mut(set) else {
            return Ok(false);
        };

        let removed = members.remove(member);
        if members.is_empty() {
            state.sets.remove(set);
        }

        Ok(removed)
    }

    fn set_members(&self, set: &str) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.read()?.sets.get(set).cloned().unwrap_or_default())
    }

    fn zset_upsert(&self, zset: &str, member: &str, score: f64) -> Result<(), StoreError> {
        if score.is_nan() {
            return Err(StoreError::InvalidScore {
                key: zset.to_string(),
                score,
            });
        }

        self.write()?
            .zsets
            .entry(zset.to_string())
            .or_default()
            .upsert(member, score);

        Ok(())
    }

    fn zset_remove(&self, zset: &str, member: &str) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let Some(sorted) = state.zsets.get_mut(zset) else {
            return Ok(false);
        };

        let removed = sorted.remove(member);
        if sorted.is_empty() {
            state.zsets.remove(zset);
        }

        Ok(removed)
    }

    fn zset_range(
        &self,
        zset: &str,
        low: f64,
        high: f64,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        let state = self.read()?;

        Ok(state
            .zsets
            .get(zset)
            .map(|sorted| sorted.range(low, high))
            .unwrap_or_default())
    }

    fn scan_prefix(&self, prefix: &str, kind: StructureKind) -> Result<Vec<String>, StoreError> {
        let state = self.read()?;

        Ok(match kind {
            StructureKind::Row => keys_with_prefix(&state.rows, prefix),
            StructureKind::Set => keys_with_prefix(&state.sets, prefix),
            StructureKind::SortedSet => keys_with_prefix(&state.zsets, prefix),
        })
    }
}

fn keys_with_prefix<V>(map: &BTreeMap<String, V>, prefix: &str) -> Vec<String> {
    map.range(prefix.to_string()..)
        .map(|(key, _)| key)
        .take_while(|key| key.starts_with(prefix))
        .cloned()
        .collect()
}

///
/// Score
///
/// Totally ordered score; negative zero is folded into zero on entry.
///

#[derive(Clone, Copy, Debug)]
struct Score(f64);

impl Score {
    const fn new(score: f64) -> Self {
        // -0.0 + 0.0 == +0.0
        Self(score + 0.0)
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

///
/// SortedSet
///
/// Member -> score map plus a (score, member) ordering for range reads.
///

#[derive(Debug, Default)]
struct SortedSet {
    scores: HashMap<String, Score>,
    order: BTreeSet<(Score, String)>,
}

impl SortedSet {
    fn upsert(&mut self, member: &str, score: f64) {
        let score = Score::new(score);

        if let Some(prev) = self.scores.insert(member.to_string(), score) {
            self.order.remove(&(prev, member.to_string()));
        }
        self.order.insert((score, member.to_string()));
    }

    fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(prev) => {
                self.order.remove(&(prev, member.to_string()));
                true
            }
            None => false,
        }
    }

    fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn range(&self, low: f64, high: f64) -> Vec<(String, f64)> {
        if low.is_nan() || high.is_nan() || low > high {
            return Vec::new();
        }

        let (low, high) = (Score::new(low), Score::new(high));

        self.order
            .range((low, String::new())..)
            .take_while(|(score, _)| *score <= high)
            .map(|(score, member)| (member.clone(), score.0))
            .collect()
    }
}
