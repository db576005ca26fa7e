//! Core runtime for kvdex: schema descriptors, values, the record codec,
//! key generation, index maintenance, and the CRUD session.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Separator between primary-key and index-key segments.
pub const KEY_SEPARATOR: char = kvdex_config::KEY_SEPARATOR;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{PrimaryKey, Row},
        model::{
            entity::EntityModel,
            field::{FieldKind, FieldModel},
        },
        traits::EntityKind,
        value::Value,
    };
}
