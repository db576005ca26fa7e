use derive_more::Display;
use kvdex_config::ConfigError;
use kvdex_core::error::{ErrorClass, ErrorDetail, ErrorOrigin as CoreErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Key of a record that was stored but left partly indexed.
    pub partial_write_key: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
            partial_write_key: None,
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let partial_write_key = match &err.detail {
            Some(ErrorDetail::PartialWrite { key }) => Some(key.to_string()),
            None => None,
        };

        Self {
            kind: err.class.into(),
            origin: err.origin.into(),
            message: err.message,
            partial_write_key,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Configuration could not be read or failed validation.
    Config,

    /// Index membership disagrees with stored records.
    IndexInconsistency,

    /// The caller cannot remediate this.
    Internal,

    /// A record failed encoding, or a stored mapping failed decoding.
    MalformedRecord,

    NotFound,

    /// The backing store could not be reached. Nothing was retried.
    StoreUnavailable,

    /// Unsupported field, operation, or key shape.
    Unsupported,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Inconsistency => Self::IndexInconsistency,
            ErrorClass::Internal => Self::Internal,
            ErrorClass::Malformed => Self::MalformedRecord,
            ErrorClass::NotFound => Self::NotFound,
            ErrorClass::Unavailable => Self::StoreUnavailable,
            ErrorClass::Unsupported => Self::Unsupported,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Codec,
    Config,
    Index,
    Key,
    Session,
    Store,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Codec => Self::Codec,
            CoreErrorOrigin::Index => Self::Index,
            CoreErrorOrigin::Key => Self::Key,
            CoreErrorOrigin::Session => Self::Session,
            CoreErrorOrigin::Store => Self::Store,
        }
    }
}
