mod memory;

pub use memory::MemoryStore;

use crate::{
    db::FieldMap,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// StoreError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("store rejected score {score} for '{key}'")]
    InvalidScore { key: String, score: f64 },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidScore { .. } => ErrorClass::Unsupported,
            Self::Unavailable { .. } => ErrorClass::Unavailable,
        }
    }
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self::new(err.class(), ErrorOrigin::Store, err.to_string())
    }
}

///
/// StructureKind
///
/// The three structure families a store key can hold.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StructureKind {
    Row,
    Set,
    SortedSet,
}

///
/// Store
///
/// Minimal command set of the external key-value store.
///
/// Each call is one independent round trip. Implementations surface
/// connectivity failures as `StoreError::Unavailable` and never retry.
/// Sets and sorted sets that become empty may be dropped by the store.
///

pub trait Store {
    /// Write (replace) the field-value mapping stored at `key`.
    fn put_row(&self, key: &str, row: &FieldMap) -> Result<(), StoreError>;

    fn get_row(&self, key: &str) -> Result<Option<FieldMap>, StoreError>;

    /// Returns whether a mapping existed.
    fn delete_row(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns whether `member` was newly added.
    fn set_add(&self, set: &str, member: &str) -> Result<bool, StoreError>;

    /// Returns whether `member` was present.
    fn set_remove(&self, set: &str, member: &str) -> Result<bool, StoreError>;

    fn set_members(&self, set: &str) -> Result<BTreeSet<String>, StoreError>;

    /// Insert `member` or overwrite its score.
    fn zset_upsert(&self, zset: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// Returns whether `member` was present.
    fn zset_remove(&self, zset: &str, member: &str) -> Result<bool, StoreError>;

    /// Members scored within `[low, high]`, ascending by score then member.
    fn zset_range(&self, zset: &str, low: f64, high: f64)
    -> Result<Vec<(String, f64)>, StoreError>;

    /// Keys of one structure kind starting with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &str, kind: StructureKind) -> Result<Vec<String>, StoreError>;
}
