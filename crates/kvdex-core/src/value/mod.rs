
use crate::model::field::FieldKind;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// CONSTANTS
///

/// Largest integer magnitude that survives a round trip through an `f64` score.
pub const F64_SAFE_I64: i64 = 1i64 << 53;

///
/// Value
///
/// Typed field value. Each variant lines up with one `FieldKind`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Float(f64),
    Int(i64),
    Text(String),
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Float(_) => FieldKind::Float,
            Self::Int(_) => FieldKind::Int,
            Self::Text(_) => FieldKind::Text,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric index score, when the value is numeric and exactly representable.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub const fn to_score(&self) -> Option<f64> {
        match self {
            Self::Float(v) if v.is_finite() => Some(*v),
            Self::Int(v) if *v >= -F64_SAFE_I64 && *v <= F64_SAFE_I64 => Some(*v as f64),
            _ => None,
        }
    }

    /// Persisted text form. Floats use the shortest representation that
    /// parses back to the same bits.
    #[must_use]
    pub fn to_field_text(&self) -> String {
        match self {
            Self::Float(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Parse persisted text as the given kind.
    #[must_use]
    pub fn parse(kind: FieldKind, text: &str) -> Option<Self> {
        match kind {
            FieldKind::Float => text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Float),
            FieldKind::Int => text.parse::<i64>().ok().map(Self::Int),
            FieldKind::Text => Some(Self::Text(text.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s:?}"),
            other => f.write_str(&other.to_field_text()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
