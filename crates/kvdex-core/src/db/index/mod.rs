//! Secondary-index maintenance.
//!
//! Text fields keep one set of primary keys per distinct value; numeric
//! fields keep one sorted set per field, scored by the field value.
//! Operations here are single store round trips and fail only when the
//! store does; shape checks happen in the codec and session before any call.


use crate::{
    db::{Keyspace, PrimaryKey, Store},
    error::InternalError,
    model::{
        entity::EntityModel,
        field::{FieldKind, FieldModel},
    },
};
use std::collections::BTreeSet;

///
/// IndexSet
///
/// Index structures of one entity, addressed through a borrowed store handle.
///

pub struct IndexSet<'a, S: Store> {
    store: &'a S,
    keyspace: &'a Keyspace,
    entity: &'static EntityModel,
}

impl<'a, S: Store> IndexSet<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, keyspace: &'a Keyspace, entity: &'static EntityModel) -> Self {
        Self {
            store,
            keyspace,
            entity,
        }
    }

    /// Resolve an indexed field of the expected kind family.
    pub fn indexed_field(
        &self,
        name: &str,
        numeric: bool,
    ) -> Result<&'static FieldModel, InternalError> {
        let entity = self.entity.entity_name;
        let field = self.entity.field(name).ok_or_else(|| {
            InternalError::index_unsupported(format!("{entity} has no field '{name}'"))
        })?;

        if !field.indexed {
            return Err(InternalError::index_unsupported(format!(
                "field '{name}' of {entity} is not indexed"
            )));
        }
        if field.kind.is_numeric() != numeric {
            let wanted = if numeric { "numeric" } else { FieldKind::Text.as_str() };

            return Err(InternalError::index_unsupported(format!(
                "field '{name}' of {entity} is {}, not {wanted}",
                field.kind
            )));
        }

        Ok(field)
    }

    //
    // Text indexes
    //

    pub fn add_string_index(
        &self,
        field: &FieldModel,
        value: &str,
        key: &PrimaryKey,
    ) -> Result<bool, InternalError> {
        let set = self.keyspace.text_index_key(self.entity, field, value);

        Ok(self.store.set_add(&set, &key.to_string())?)
    }

    pub fn remove_string_index(
        &self,
        field: &FieldModel,
        value: &str,
        key: &PrimaryKey,
    ) -> Result<bool, InternalError> {
        let set = self.keyspace.text_index_key(self.entity, field, value);

        Ok(self.store.set_remove(&set, &key.to_string())?)
    }

    /// Exact-match lookup. Members that do not parse as primary keys are
    /// reported as an inconsistency rather than skipped.
    pub fn query_string_index(
        &self,
        field: &FieldModel,
        value: &str,
    ) -> Result<BTreeSet<PrimaryKey>, InternalError> {
        let set = self.keyspace.text_index_key(self.entity, field, value);

        self.store
            .set_members(&set)?
            .iter()
            .map(|member| parse_member(&set, member))
            .collect()
    }

    //
    // Numeric indexes
    //

    pub fn set_numeric_index(
        &self,
        field: &FieldModel,
        key: &PrimaryKey,
        score: f64,
    ) -> Result<(), InternalError> {
        let zset = self.keyspace.numeric_index_key(self.entity, field);

        Ok(self.store.zset_upsert(&zset, &key.to_string(), score)?)
    }

    pub fn remove_numeric_index(
        &self,
        field: &FieldModel,
        key: &PrimaryKey,
    ) -> Result<bool, InternalError> {
        let zset = self.keyspace.numeric_index_key(self.entity, field);

        Ok(self.store.zset_remove(&zset, &key.to_string())?)
    }

    /// Inclusive range, ascending by score.
    pub fn query_numeric_range(
        &self,
        field: &FieldModel,
        low: f64,
        high: f64,
    ) -> Result<Vec<PrimaryKey>, InternalError> {
        Ok(self
            .scored_range(field, low, high)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    /// Inclusive range with scores, ascending by score.
    pub fn scored_range(
        &self,
        field: &FieldModel,
        low: f64,
        high: f64,
    ) -> Result<Vec<(PrimaryKey, f64)>, InternalError> {
        let zset = self.keyspace.numeric_index_key(self.entity, field);

        self.store
            .zset_range(&zset, low, high)?
            .into_iter()
            .map(|(member, score)| Ok((parse_member(&zset, &member)?, score)))
            .collect()
    }
}

fn parse_member(index_key: &str, member: &str) -> Result<PrimaryKey, InternalError> {
    PrimaryKey::parse(member).map_err(|err| {
        InternalError::index_inconsistency(format!("index '{index_key}' holds bad member: {err}"))
    })
}
