//! Runtime configuration for kvdex sessions.
//!
//! Configuration is plain data: it is parsed from TOML, validated once, and
//! handed to the core session builder. Nothing here touches a store.


use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Default upper bound for one encoded field value.
pub const DEFAULT_MAX_FIELD_BYTES: usize = 64 * 1024;

/// Separator used between key segments; forbidden inside a namespace.
pub const KEY_SEPARATOR: char = ':';

///
/// ConfigError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

///
/// ConsistencyMode
///
/// How reads through an index treat references to rows that no longer exist.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    /// Skip stale references and count them.
    #[default]
    MissingOk,

    /// Fail the read on the first stale reference.
    Strict,
}

///
/// DbConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// Optional prefix prepended to every store key as `<namespace>:`.
    pub namespace: Option<String>,

    /// Largest accepted encoded field value, in bytes.
    pub max_field_bytes: usize,

    /// Missing-row policy for index reads.
    pub read_consistency: ConsistencyMode,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            max_field_bytes: DEFAULT_MAX_FIELD_BYTES,
            read_consistency: ConsistencyMode::default(),
        }
    }
}

impl DbConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse, and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(namespace) = &self.namespace {
            if namespace.is_empty() {
                return Err(ConfigError::invalid("namespace must not be empty"));
            }
            if namespace.contains(KEY_SEPARATOR) {
                return Err(ConfigError::invalid(format!(
                    "namespace '{namespace}' must not contain '{KEY_SEPARATOR}'"
                )));
            }
        }

        if self.max_field_bytes == 0 {
            return Err(ConfigError::invalid("max_field_bytes must be positive"));
        }

        Ok(())
    }
}
