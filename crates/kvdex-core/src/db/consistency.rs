use crate::{
    db::{
        IndexSet, Keyspace, PrimaryKey, RecordCodec, Row,
        store::{Store, StructureKind},
    },
    error::InternalError,
    model::field::FieldModel,
    obs::sink::Span,
    traits::EntityKind,
    value::Value,
};
use kvdex_config::ConsistencyMode;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

///
/// ReadConsistency
///
/// Missing-row handling policy for reads that go through an index.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReadConsistency {
    /// Stale index members are skipped and counted.
    #[default]
    MissingOk,

    /// A stale index member fails the read with an inconsistency error.
    Strict,
}

impl From<ConsistencyMode> for ReadConsistency {
    fn from(mode: ConsistencyMode) -> Self {
        match mode {
            ConsistencyMode::MissingOk => Self::MissingOk,
            ConsistencyMode::Strict => Self::Strict,
        }
    }
}

///
/// IndexReport
///
/// Outcome of comparing an entity's index structures with its stored rows.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct IndexReport {
    pub entity: &'static str,
    /// Rows that decoded cleanly.
    pub rows: u64,
    /// Rows that failed to decode; their index members are left untouched.
    pub malformed_rows: u64,
    /// Members whose row does not exist.
    pub stale_refs: u64,
    /// Members filed under a value or score the row no longer holds.
    pub mismatched_refs: u64,
    /// Indexed fields of live rows with no membership at all.
    pub missing_refs: u64,
    /// Whether the scan also rewrote the index structures.
    pub repaired: bool,
}

impl IndexReport {
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.stale_refs == 0 && self.mismatched_refs == 0 && self.missing_refs == 0
    }
}

///
/// IndexAudit
///
/// One full pass over the rows and index structures of an entity.
///

pub(crate) struct IndexAudit<'a, S: Store> {
    pub(crate) store: &'a S,
    pub(crate) keyspace: &'a Keyspace,
    pub(crate) codec: &'a RecordCodec,
    pub(crate) repair: bool,
}

// live rows plus keys whose rows exist but cannot be decoded
struct Rows {
    live: BTreeMap<PrimaryKey, Row>,
    malformed: BTreeSet<PrimaryKey>,
}

impl<S: Store> IndexAudit<'_, S> {
    pub(crate) fn run<E: EntityKind>(&self, span: &Span<'_>) -> Result<IndexReport, InternalError> {
        let model = E::MODEL;
        let mut report = IndexReport {
            entity: model.entity_name,
            repaired: self.repair,
            ..IndexReport::default()
        };

        // Phase 1: load authoritative rows
        let rows = self.load_rows::<E>()?;
        report.rows = rows.live.len() as u64;
        report.malformed_rows = rows.malformed.len() as u64;

        // Phase 2: walk every index structure, then fill the gaps
        let index = IndexSet::new(self.store, self.keyspace, model);

        for field in model.indexed_fields() {
            let seen = if field.kind.is_numeric() {
                self.walk_numeric::<E>(field, &rows, &mut report, span)?
            } else {
                self.walk_text::<E>(field, &rows, &mut report, span)?
            };

            for (key, row) in &rows.live {
                if seen.contains(key) {
                    continue;
                }
                report.missing_refs += 1;

                if self.repair {
                    let Some(value) = row.get(field.name) else {
                        continue;
                    };
                    match value {
                        Value::Text(text) => {
                            index.add_string_index(field, text, key)?;
                        }
                        numeric => {
                            if let Some(score) = numeric.to_score() {
                                index.set_numeric_index(field, key, score)?;
                            }
                        }
                    }
                    span.index_insert();
                }
            }
        }

        Ok(report)
    }

    fn load_rows<E: EntityKind>(&self) -> Result<Rows, InternalError> {
        let model = E::MODEL;
        let mut rows = Rows {
            live: BTreeMap::new(),
            malformed: BTreeSet::new(),
        };

        let prefix = self.keyspace.row_prefix(model);
        for row_key in self.store.scan_prefix(&prefix, StructureKind::Row)? {
            let Some(key) = self.keyspace.primary_key(&row_key) else {
                continue;
            };
            if key.entity_name() != model.entity_name {
                continue;
            }
            // deleted between scan and read
            let Some(map) = self.store.get_row(&row_key)? else {
                continue;
            };

            match self.codec.decode_row::<E>(&map) {
                Ok(row) => {
                    rows.live.insert(key, row);
                }
                Err(_) => {
                    rows.malformed.insert(key);
                }
            }
        }

        Ok(rows)
    }

    fn walk_text<E: EntityKind>(
        &self,
        field: &'static FieldModel,
        rows: &Rows,
        report: &mut IndexReport,
        span: &Span<'_>,
    ) -> Result<BTreeSet<PrimaryKey>, InternalError> {
        let prefix = self.keyspace.text_index_prefix(E::MODEL, field);
        let mut seen = BTreeSet::new();

        for set_key in self.store.scan_prefix(&prefix, StructureKind::Set)? {
            let value = &set_key[prefix.len()..];

            for member in self.store.set_members(&set_key)? {
                let key = PrimaryKey::parse(&member).ok();
                if key.as_ref().is_some_and(|k| rows.malformed.contains(k)) {
                    continue;
                }

                match key.as_ref().and_then(|k| rows.live.get(k).map(|row| (k, row))) {
                    Some((key, row)) if row.get(field.name).and_then(Value::as_text) == Some(value) => {
                        seen.insert(key.clone());
                        continue;
                    }
                    Some(_) => report.mismatched_refs += 1,
                    None => {
                        report.stale_refs += 1;
                        span.stale_ref();
                    }
                }

                if self.repair {
                    self.store.set_remove(&set_key, &member)?;
                    span.index_remove();
                }
            }
        }

        Ok(seen)
    }

    fn walk_numeric<E: EntityKind>(
        &self,
        field: &'static FieldModel,
        rows: &Rows,
        report: &mut IndexReport,
        span: &Span<'_>,
    ) -> Result<BTreeSet<PrimaryKey>, InternalError> {
        let zset = self.keyspace.numeric_index_key(E::MODEL, field);
        let mut seen = BTreeSet::new();

        let members = self
            .store
            .zset_range(&zset, f64::NEG_INFINITY, f64::INFINITY)?;

        for (member, score) in members {
            let key = PrimaryKey::parse(&member).ok();
            if key.as_ref().is_some_and(|k| rows.malformed.contains(k)) {
                continue;
            }

            match key.as_ref().and_then(|k| rows.live.get(k).map(|row| (k, row))) {
                Some((key, row)) => {
                    let expected = row.get(field.name).and_then(Value::to_score);
                    if expected != Some(score) {
                        report.mismatched_refs += 1;

                        if self.repair
                            && let Some(expected) = expected
                        {
                            self.store.zset_upsert(&zset, &member, expected)?;
                            span.index_insert();
                        }
                    }
                    seen.insert(key.clone());
                }
                None => {
                    report.stale_refs += 1;
                    span.stale_ref();

                    if self.repair {
                        self.store.zset_remove(&zset, &member)?;
                        span.index_remove();
                    }
                }
            }
        }

        Ok(seen)
    }
}
