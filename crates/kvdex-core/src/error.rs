use crate::db::PrimaryKey;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Every subsystem error converts into this type at the session boundary.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured detail for failures the caller is expected to repair.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach the key of a record that was written but not fully indexed.
    #[must_use]
    pub(crate) fn with_partial_write(mut self, key: PrimaryKey) -> Self {
        self.detail = Some(ErrorDetail::PartialWrite { key });
        self
    }

    /// Key of the record left behind by a failed create, if any.
    #[must_use]
    pub const fn partial_write_key(&self) -> Option<&PrimaryKey> {
        match &self.detail {
            Some(ErrorDetail::PartialWrite { key }) => Some(key),
            None => None,
        }
    }

    /// Construct a session-origin not-found error for a primary key.
    pub fn not_found(key: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Session,
            format!("record not found: {key}"),
        )
    }

    /// Construct an index-origin inconsistency error.
    pub(crate) fn index_inconsistency(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Inconsistency, ErrorOrigin::Index, message)
    }

    /// Construct an index-origin unsupported error.
    pub(crate) fn index_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Index, message)
    }

    /// Construct a session-origin unsupported error.
    pub(crate) fn session_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Session, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self.class, ErrorClass::Malformed)
    }

    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self.class, ErrorClass::Unavailable)
    }

    #[must_use]
    pub const fn is_inconsistency(&self) -> bool {
        matches!(self.class, ErrorClass::Inconsistency)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorDetail {
    /// The mapping was stored under `key` but its index entries were not all written.
    PartialWrite { key: PrimaryKey },
}

///
/// ErrorClass
/// Error taxonomy surfaced to callers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Stored index membership disagrees with stored rows.
    Inconsistency,
    Internal,
    /// A record could not be encoded or a stored mapping could not be decoded.
    Malformed,
    NotFound,
    /// The store could not be reached; never retried internally.
    Unavailable,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Inconsistency => "index_inconsistency",
            Self::Internal => "internal",
            Self::Malformed => "malformed_record",
            Self::NotFound => "not_found",
            Self::Unavailable => "store_unavailable",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Subsystem that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Codec,
    Index,
    Key,
    Session,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Index => "index",
            Self::Key => "key",
            Self::Session => "session",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}
