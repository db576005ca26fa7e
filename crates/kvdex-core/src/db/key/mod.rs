mod generator;

pub use generator::KeyGenerator;

use crate::{
    KEY_SEPARATOR,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;
use ulid::Ulid;

///
/// KeyError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum KeyError {
    #[error("primary key '{key}' has an invalid id")]
    InvalidId { key: String },

    #[error("primary key '{key}' is not of the form <entity>:<id>")]
    Malformed { key: String },

    #[error("key generator exhausted ids for the current millisecond")]
    Overflow,
}

impl KeyError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidId { .. } | Self::Malformed { .. } => ErrorClass::Unsupported,
            Self::Overflow => ErrorClass::Internal,
        }
    }
}

impl From<KeyError> for InternalError {
    fn from(err: KeyError) -> Self {
        Self::new(err.class(), ErrorOrigin::Key, err.to_string())
    }
}

///
/// PrimaryKey
///
/// `<entity-name>:<ulid>`. Assigned once at creation and never reused.
/// Ordered by entity name, then by id (creation order within one generator).
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct PrimaryKey {
    entity: String,
    id: Ulid,
}

impl PrimaryKey {
    #[must_use]
    pub fn new(entity: impl Into<String>, id: Ulid) -> Self {
        Self {
            entity: entity.into(),
            id,
        }
    }

    /// Parse the text form, validating both segments.
    pub fn parse(text: &str) -> Result<Self, KeyError> {
        let Some((entity, id)) = text.rsplit_once(KEY_SEPARATOR) else {
            return Err(KeyError::Malformed {
                key: text.to_string(),
            });
        };
        if entity.is_empty() || entity.contains(KEY_SEPARATOR) {
            return Err(KeyError::Malformed {
                key: text.to_string(),
            });
        }

        let id = Ulid::from_string(id).map_err(|_| KeyError::InvalidId {
            key: text.to_string(),
        })?;

        Ok(Self::new(entity, id))
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub const fn id(&self) -> Ulid {
        self.id
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.entity, self.id)
    }
}

impl FromStr for PrimaryKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<PrimaryKey> for String {
    fn from(key: PrimaryKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PrimaryKey {
    type Error = KeyError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::parse(&text)
    }
}
