mod entity;
mod store;

pub(crate) use entity::{Person, Pet};
pub(crate) use store::FaultyStore;

use crate::db::{DbSession, MemoryStore};

/// Session over a fresh in-memory store with default configuration.
pub(crate) fn memory_session() -> DbSession<MemoryStore> {
    DbSession::new(MemoryStore::new())
}

/// Session over a store that starts failing after `budget` successful calls.
pub(crate) fn faulty_session(budget: usize) -> DbSession<FaultyStore> {
    DbSession::new(FaultyStore::new(budget))
}
