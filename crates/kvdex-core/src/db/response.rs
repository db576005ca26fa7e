use crate::{db::PrimaryKey, traits::EntityKind};

///
/// LoadResponse
///
/// Hydrated `(key, record)` pairs in index order, plus the number of index
/// members that were skipped because their row no longer exists.
///

#[derive(Debug)]
pub struct LoadResponse<E: EntityKind> {
    rows: Vec<(PrimaryKey, E)>,
    stale_refs: u64,
}

impl<E: EntityKind> LoadResponse<E> {
    #[must_use]
    pub(crate) const fn new(rows: Vec<(PrimaryKey, E)>, stale_refs: u64) -> Self {
        Self { rows, stale_refs }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index members skipped during hydration.
    #[must_use]
    pub const fn stale_refs(&self) -> u64 {
        self.stale_refs
    }

    #[must_use]
    pub fn rows(&self) -> &[(PrimaryKey, E)] {
        &self.rows
    }

    #[must_use]
    pub fn keys(&self) -> Vec<PrimaryKey> {
        self.rows.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn entities(&self) -> impl Iterator<Item = &E> {
        self.rows.iter().map(|(_, entity)| entity)
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<(PrimaryKey, E)> {
        self.rows
    }

    #[must_use]
    pub fn into_entities(self) -> Vec<E> {
        self.rows.into_iter().map(|(_, entity)| entity).collect()
    }
}

impl<E: EntityKind> IntoIterator for LoadResponse<E> {
    type Item = (PrimaryKey, E);
    type IntoIter = std::vec::IntoIter<(PrimaryKey, E)>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
