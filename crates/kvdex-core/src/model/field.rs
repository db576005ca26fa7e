use std::fmt::{self, Display};

///
/// FieldModel
/// Runtime field metadata used by the codec and index maintenance.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as persisted in the field-value mapping.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Whether the field is kept in an index structure.
    pub indexed: bool,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind, indexed: bool) -> Self {
        Self {
            name,
            kind,
            indexed,
        }
    }

    /// Declare an indexed field.
    #[must_use]
    pub const fn indexed(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, true)
    }

    /// Declare a stored, non-indexed field.
    #[must_use]
    pub const fn stored(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, false)
    }
}

///
/// FieldKind
///
/// Text fields are indexed by exact value; numeric fields by score.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FieldKind {
    Float,
    Int,
    Text,
}

impl FieldKind {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Float | Self::Int)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Text => "text",
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
