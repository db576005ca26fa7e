use crate::{
    db::{CodecError, Row},
    model::entity::EntityModel,
    value::Value,
};

///
/// EntityKind
///
/// A record type with a statically declared schema.
///
/// `value` projects one declared field; `from_row` rebuilds the record from
/// a row the codec has already validated against `MODEL`.
///

pub trait EntityKind: Sized {
    const MODEL: &'static EntityModel;

    /// Current value of a declared field, or `None` for an undeclared name.
    fn value(&self, field: &str) -> Option<Value>;

    fn from_row(row: &Row) -> Result<Self, CodecError>;

    #[must_use]
    fn entity_name() -> &'static str {
        Self::MODEL.entity_name
    }
}
