//! ## Crate layout
//! - `config`: TOML session configuration and validation.
//! - `core`: schema descriptors, values, the record codec, index maintenance,
//!   the CRUD session, and observability.
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module carries what application code needs to declare an
//! entity and drive a session.

pub use kvdex_config as config;
pub use kvdex_core as core;

pub mod error;


pub use error::{Error, ErrorKind, ErrorOrigin};

use kvdex_config::DbConfig;
use kvdex_core::db::{DbSession, Store};
use std::path::Path;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Session over `store`, configured from an optional TOML file.
/// `None` means defaults.
pub fn open<S: Store>(store: S, config_path: Option<&Path>) -> Result<DbSession<S>, Error> {
    let config = match config_path {
        Some(path) => DbConfig::from_path(path)?,
        None => DbConfig::default(),
    };

    Ok(DbSession::with_config(store, &config)?)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error,
        config::DbConfig,
        core::{
            db::{
                CodecError, DbSession, LoadResponse, MemoryStore, PrimaryKey, ReadConsistency,
                Row, Store,
            },
            model::{
                entity::EntityModel,
                field::{FieldKind, FieldModel},
            },
            traits::EntityKind,
            value::Value,
        },
    };
}
