//! CRUD coordination over an injected store.
//!
//! Every operation is a short sequence of independent store round trips.
//! Nothing is locked across steps and nothing is compensated on failure:
//! a call that fails part-way leaves the store exactly as far as it got.
//!
//! Step order:
//! - create: mapping, then index entries
//! - update: index entries for changed fields, then mapping
//! - delete: index entries, then mapping
//!
//! A failed update can leave its key in no value-set for a changed text
//! field (old membership removed, new one never added). Reads do not see
//! that gap; `check_indexes` reports it and `repair_indexes` restores it.


use crate::{
    db::{
        IndexReport, IndexSet, KeyGenerator, Keyspace, LoadResponse, PrimaryKey, ReadConsistency,
        RecordCodec, Row, Store, consistency::IndexAudit,
    },
    error::InternalError,
    model::{entity::EntityModel, field::FieldModel},
    obs::sink::{ExecKind, GLOBAL_METRICS_SINK, MetricsSink, Span},
    traits::EntityKind,
    value::Value,
};
use kvdex_config::{ConfigError, DbConfig};

///
/// DbSession
///
/// Store handle plus the policy (key layout, codec limits, read
/// consistency, metrics sink) that every call runs under.
///

pub struct DbSession<S: Store> {
    store: S,
    keyspace: Keyspace,
    codec: RecordCodec,
    keys: KeyGenerator,
    consistency: ReadConsistency,
    metrics: Option<&'static dyn MetricsSink>,
}

impl<S: Store> DbSession<S> {
    /// Session with the default configuration.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::configured(store, &DbConfig::default())
    }

    /// Session configured from `config`, which is validated first.
    pub fn with_config(store: S, config: &DbConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self::configured(store, config))
    }

    fn configured(store: S, config: &DbConfig) -> Self {
        Self {
            store,
            keyspace: Keyspace::new(config.namespace.as_deref()),
            codec: RecordCodec::new(config.max_field_bytes),
            keys: KeyGenerator::new(),
            consistency: config.read_consistency.into(),
            metrics: None,
        }
    }

    #[must_use]
    pub const fn consistency(mut self, consistency: ReadConsistency) -> Self {
        self.consistency = consistency;
        self
    }

    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    //
    // Create
    //

    /// Store a new record and index it. Returns the generated key.
    ///
    /// If an index write fails the mapping stays behind with partial
    /// indexes. The error then carries the key
    /// ([`InternalError::partial_write_key`]) so the caller can `delete` it.
    pub fn create<E: EntityKind>(&self, entity: &E) -> Result<PrimaryKey, InternalError> {
        let model = Self::model::<E>()?;
        let mut span = self.span(ExecKind::Create, model);

        let row = self.codec.encode_row(entity)?;
        let key = self.keys.new_key(model.entity_name)?;

        self.store
            .put_row(&self.keyspace.row_key(&key), &row.to_field_map())?;
        span.set_rows(1);

        let index = self.index(model);
        for (field, value) in row.iter().filter(|(field, _)| field.indexed) {
            Self::add_membership(&index, &span, field, value, &key)
                .map_err(|err| err.with_partial_write(key.clone()))?;
        }

        Ok(key)
    }

    //
    // Load
    //

    /// Load one record by primary key.
    pub fn load<E: EntityKind>(&self, key: &PrimaryKey) -> Result<E, InternalError> {
        let model = Self::model::<E>()?;
        Self::check_key(model, key)?;
        let mut span = self.span(ExecKind::Load, model);

        let row = self
            .fetch_row::<E>(key)?
            .ok_or_else(|| InternalError::not_found(key))?;
        let entity = E::from_row(&row)?;
        span.set_rows(1);

        Ok(entity)
    }

    /// Whether a mapping is stored under `key`.
    pub fn exists<E: EntityKind>(&self, key: &PrimaryKey) -> Result<bool, InternalError> {
        let model = Self::model::<E>()?;
        Self::check_key(model, key)?;

        Ok(self.store.get_row(&self.keyspace.row_key(key))?.is_some())
    }

    /// Records whose indexed text field equals `value`.
    pub fn load_by_field<E: EntityKind>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<LoadResponse<E>, InternalError> {
        let model = Self::model::<E>()?;
        let mut span = self.span(ExecKind::Load, model);

        let index = self.index(model);
        let field = index.indexed_field(field, false)?;
        let keys = index.query_string_index(field, value)?;

        self.hydrate(keys, &mut span, |row| {
            row.get(field.name).and_then(Value::as_text) == Some(value)
        })
    }

    /// Records whose indexed numeric field lies in `[low, high]`, ascending.
    pub fn load_by_range<E: EntityKind>(
        &self,
        field: &str,
        low: f64,
        high: f64,
    ) -> Result<LoadResponse<E>, InternalError> {
        let model = Self::model::<E>()?;
        if low.is_nan() || high.is_nan() {
            return Err(InternalError::session_unsupported(
                "range bounds must not be NaN",
            ));
        }
        let mut span = self.span(ExecKind::Load, model);

        let index = self.index(model);
        let field = index.indexed_field(field, true)?;
        let keys = index.query_numeric_range(field, low, high)?;

        self.hydrate(keys, &mut span, |row| {
            row.get(field.name)
                .and_then(Value::to_score)
                .is_some_and(|score| low <= score && score <= high)
        })
    }

    //
    // Update
    //

    /// Apply `mutate` to the stored record and reconcile the indexes of
    /// every indexed field whose value changed. Returns the new record.
    pub fn update<E: EntityKind>(
        &self,
        key: &PrimaryKey,
        mutate: impl FnOnce(&mut E),
    ) -> Result<E, InternalError> {
        let model = Self::model::<E>()?;
        Self::check_key(model, key)?;
        let mut span = self.span(ExecKind::Update, model);

        let before = self
            .fetch_row::<E>(key)?
            .ok_or_else(|| InternalError::not_found(key))?;
        let mut entity = E::from_row(&before)?;
        mutate(&mut entity);
        let after = self.codec.encode_row(&entity)?;

        let index = self.index(model);
        for (field, value) in after.iter().filter(|(field, _)| field.indexed) {
            let previous = before.get(field.name);
            if previous == Some(value) {
                continue;
            }

            if let Some(Value::Text(old)) = previous
                && index.remove_string_index(field, old, key)?
            {
                span.index_remove();
            }
            Self::add_membership(&index, &span, field, value, key)?;
        }

        self.store
            .put_row(&self.keyspace.row_key(key), &after.to_field_map())?;
        span.set_rows(1);

        Ok(entity)
    }

    //
    // Delete
    //

    /// Remove a record and all of its index memberships.
    ///
    /// Deleting an absent key succeeds and returns `false`. Index removal
    /// reads the stored text directly, so a mapping that no longer decodes
    /// can still be deleted.
    pub fn delete<E: EntityKind>(&self, key: &PrimaryKey) -> Result<bool, InternalError> {
        let model = Self::model::<E>()?;
        Self::check_key(model, key)?;
        let mut span = self.span(ExecKind::Delete, model);

        let row_key = self.keyspace.row_key(key);
        let Some(map) = self.store.get_row(&row_key)? else {
            return Ok(false);
        };

        let index = self.index(model);
        for field in model.indexed_fields() {
            let removed = if field.kind.is_numeric() {
                index.remove_numeric_index(field, key)?
            } else if let Some(text) = map.get(field.name) {
                index.remove_string_index(field, text, key)?
            } else {
                false
            };

            if removed {
                span.index_remove();
            }
        }

        let deleted = self.store.delete_row(&row_key)?;
        span.set_rows(u64::from(deleted));

        Ok(deleted)
    }

    //
    // Index maintenance
    //

    /// Compare an entity's index structures with its rows without writing.
    pub fn check_indexes<E: EntityKind>(&self) -> Result<IndexReport, InternalError> {
        self.audit::<E>(false)
    }

    /// Remove stale and mismatched memberships and restore missing ones.
    pub fn repair_indexes<E: EntityKind>(&self) -> Result<IndexReport, InternalError> {
        self.audit::<E>(true)
    }

    fn audit<E: EntityKind>(&self, repair: bool) -> Result<IndexReport, InternalError> {
        let model = Self::model::<E>()?;
        let mut span = self.span(ExecKind::Check, model);

        let report = IndexAudit {
            store: &self.store,
            keyspace: &self.keyspace,
            codec: &self.codec,
            repair,
        }
        .run::<E>(&span)?;
        span.set_rows(report.rows);

        Ok(report)
    }

    //
    // Helpers
    //

    fn model<E: EntityKind>() -> Result<&'static EntityModel, InternalError> {
        let model = E::MODEL;
        model
            .validate()
            .map_err(InternalError::session_unsupported)?;

        Ok(model)
    }

    fn check_key(model: &EntityModel, key: &PrimaryKey) -> Result<(), InternalError> {
        if key.entity_name() != model.entity_name {
            return Err(InternalError::session_unsupported(format!(
                "key {key} does not belong to entity {}",
                model.entity_name
            )));
        }

        Ok(())
    }

    fn sink(&self) -> &dyn MetricsSink {
        self.metrics.unwrap_or(&GLOBAL_METRICS_SINK)
    }

    fn span(&self, kind: ExecKind, model: &'static EntityModel) -> Span<'_> {
        Span::new(self.sink(), kind, model.entity_name)
    }

    fn index(&self, model: &'static EntityModel) -> IndexSet<'_, S> {
        IndexSet::new(&self.store, &self.keyspace, model)
    }

    fn fetch_row<E: EntityKind>(&self, key: &PrimaryKey) -> Result<Option<Row>, InternalError> {
        let Some(map) = self.store.get_row(&self.keyspace.row_key(key))? else {
            return Ok(None);
        };

        Ok(Some(self.codec.decode_row::<E>(&map)?))
    }

    // Write the membership for one indexed field value.
    fn add_membership(
        index: &IndexSet<'_, S>,
        span: &Span<'_>,
        field: &FieldModel,
        value: &Value,
        key: &PrimaryKey,
    ) -> Result<(), InternalError> {
        match value {
            Value::Text(text) => {
                index.add_string_index(field, text, key)?;
            }
            numeric => {
                // the codec rejects numeric values without a score
                let score = numeric.to_score().ok_or_else(|| {
                    InternalError::index_unsupported(format!(
                        "field '{}' has no numeric score",
                        field.name
                    ))
                })?;
                index.set_numeric_index(field, key, score)?;
            }
        }
        span.index_insert();

        Ok(())
    }

    // Turn index keys into records, skipping members whose row is gone or no
    // longer matches the lookup that produced them.
    fn hydrate<E: EntityKind>(
        &self,
        keys: impl IntoIterator<Item = PrimaryKey>,
        span: &mut Span<'_>,
        matches: impl Fn(&Row) -> bool,
    ) -> Result<LoadResponse<E>, InternalError> {
        let mut rows = Vec::new();
        let mut stale_refs = 0u64;

        for key in keys {
            let row = self.fetch_row::<E>(&key)?.filter(|row| matches(row));

            match row {
                Some(row) => rows.push((key, E::from_row(&row)?)),
                None => {
                    span.stale_ref();
                    if self.consistency == ReadConsistency::Strict {
                        return Err(InternalError::index_inconsistency(format!(
                            "index references {key}, which is missing or no longer matches"
                        )));
                    }
                    stale_refs += 1;
                }
            }
        }
        span.set_rows(rows.len() as u64);

        Ok(LoadResponse::new(rows, stale_refs))
    }
}
