
use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::field::{FieldKind, FieldModel},
    traits::EntityKind,
    value::Value,
};
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// CodecError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("field '{field}' of {entity} holds {found}, declared {expected}")]
    KindMismatch {
        entity: &'static str,
        field: &'static str,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("field '{field}' of {entity} is missing")]
    MissingField {
        entity: &'static str,
        field: String,
    },

    #[error("field '{field}' of {entity} is outside the exact numeric range")]
    OutOfRange {
        entity: &'static str,
        field: &'static str,
    },

    #[error("field '{field}' of {entity} cannot parse {text:?} as {kind}")]
    Parse {
        entity: &'static str,
        field: &'static str,
        kind: FieldKind,
        text: String,
    },

    #[error("field '{field}' of {entity} is {len} bytes (limit {max_bytes})")]
    TooLarge {
        entity: &'static str,
        field: &'static str,
        len: usize,
        max_bytes: usize,
    },
}

impl From<CodecError> for InternalError {
    fn from(err: CodecError) -> Self {
        Self::new(ErrorClass::Malformed, ErrorOrigin::Codec, err.to_string())
    }
}

///
/// FieldMap
///
/// Flattened record as persisted: `(field, text)` pairs in declaration order.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, IntoIterator, PartialEq, Serialize)]
pub struct FieldMap(Vec<(String, String)>);

impl FieldMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a pair, replacing an earlier pair with the same field name.
    pub fn insert(&mut self, field: impl Into<String>, text: impl Into<String>) {
        let field = field.into();
        let text = text.into();

        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = text,
            None => self.0.push((field, text)),
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, text)| text.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (field, text) in iter {
            map.insert(field, text);
        }

        map
    }
}

///
/// Row
///
/// Typed values for every declared field of one entity, in declaration order.
/// Only the codec constructs rows, so a row always matches its model.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    entity: &'static str,
    values: Vec<(&'static FieldModel, Value)>,
}

impl Row {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(model, _)| model.name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldModel, &Value)> {
        self.values.iter().map(|(model, value)| (*model, value))
    }

    pub fn text(&self, field: &'static str) -> Result<String, CodecError> {
        match self.lookup(field)? {
            Value::Text(s) => Ok(s.clone()),
            other => Err(self.mismatch(field, FieldKind::Text, other)),
        }
    }

    pub fn int(&self, field: &'static str) -> Result<i64, CodecError> {
        match self.lookup(field)? {
            Value::Int(v) => Ok(*v),
            other => Err(self.mismatch(field, FieldKind::Int, other)),
        }
    }

    pub fn float(&self, field: &'static str) -> Result<f64, CodecError> {
        match self.lookup(field)? {
            Value::Float(v) => Ok(*v),
            other => Err(self.mismatch(field, FieldKind::Float, other)),
        }
    }

    /// Persisted form of the row.
    #[must_use]
    pub fn to_field_map(&self) -> FieldMap {
        self.values
            .iter()
            .map(|(model, value)| (model.name, value.to_field_text()))
            .collect()
    }

    fn lookup(&self, field: &'static str) -> Result<&Value, CodecError> {
        self.get(field).ok_or_else(|| CodecError::MissingField {
            entity: self.entity,
            field: field.to_string(),
        })
    }

    fn mismatch(&self, field: &'static str, expected: FieldKind, found: &Value) -> CodecError {
        CodecError::KindMismatch {
            entity: self.entity,
            field,
            expected,
            found: found.kind(),
        }
    }
}

///
/// RecordCodec
///
/// Converts records to and from field-value mappings. Pure; never touches a store.
///

#[derive(Clone, Copy, Debug)]
pub struct RecordCodec {
    max_field_bytes: usize,
}

impl RecordCodec {
    #[must_use]
    pub const fn new(max_field_bytes: usize) -> Self {
        Self { max_field_bytes }
    }

    /// Encode a record into its persisted mapping.
    pub fn encode<E: EntityKind>(&self, entity: &E) -> Result<FieldMap, CodecError> {
        Ok(self.encode_row(entity)?.to_field_map())
    }

    /// Decode a persisted mapping back into a record.
    pub fn decode<E: EntityKind>(&self, map: &FieldMap) -> Result<E, CodecError> {
        E::from_row(&self.decode_row::<E>(map)?)
    }

    /// Project and validate every declared field of a record.
    pub fn encode_row<E: EntityKind>(&self, entity: &E) -> Result<Row, CodecError> {
        let model = E::MODEL;
        let mut values = Vec::with_capacity(model.fields.len());

        for field in model.fields {
            let value = entity
                .value(field.name)
                .ok_or_else(|| CodecError::MissingField {
                    entity: model.entity_name,
                    field: field.name.to_string(),
                })?;

            if value.kind() != field.kind {
                return Err(CodecError::KindMismatch {
                    entity: model.entity_name,
                    field: field.name,
                    expected: field.kind,
                    found: value.kind(),
                });
            }

            // numeric values must survive the trip through an index score
            if field.kind.is_numeric() && value.to_score().is_none() {
                return Err(CodecError::OutOfRange {
                    entity: model.entity_name,
                    field: field.name,
                });
            }

            // same limit decode applies to the persisted text
            let len = match &value {
                Value::Text(text) => text.len(),
                other => other.to_field_text().len(),
            };
            self.check_len(model.entity_name, field, len)?;

            values.push((field, value));
        }

        Ok(Row {
            entity: model.entity_name,
            values,
        })
    }

    /// Parse a persisted mapping against the declared fields.
    pub fn decode_row<E: EntityKind>(&self, map: &FieldMap) -> Result<Row, CodecError> {
        let model = E::MODEL;
        let mut values = Vec::with_capacity(model.fields.len());

        for field in model.fields {
            let text = map.get(field.name).ok_or_else(|| CodecError::MissingField {
                entity: model.entity_name,
                field: field.name.to_string(),
            })?;
            self.check_len(model.entity_name, field, text.len())?;

            let value = Value::parse(field.kind, text)
                .filter(|value| !field.kind.is_numeric() || value.to_score().is_some())
                .ok_or_else(|| CodecError::Parse {
                    entity: model.entity_name,
                    field: field.name,
                    kind: field.kind,
                    text: text.to_string(),
                })?;

            values.push((field, value));
        }

        Ok(Row {
            entity: model.entity_name,
            values,
        })
    }

    const fn check_len(
        &self,
        entity: &'static str,
        field: &'static FieldModel,
        len: usize,
    ) -> Result<(), CodecError> {
        if len > self.max_field_bytes {
            return Err(CodecError::TooLarge {
                entity,
                field: field.name,
                len,
                max_bytes: self.max_field_bytes,
            });
        }

        Ok(())
    }
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new(kvdex_config::DEFAULT_MAX_FIELD_BYTES)
    }
}
