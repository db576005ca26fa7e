use crate::{KEY_SEPARATOR, model::field::FieldModel};

///
/// EntityModel
/// Static runtime model for one record type.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Stable external name used as the primary-key and index-key prefix.
    pub entity_name: &'static str,
    /// Ordered field list; persisted mappings follow this order.
    pub fields: &'static [FieldModel],
}

impl EntityModel {
    #[must_use]
    pub const fn new(entity_name: &'static str, fields: &'static [FieldModel]) -> Self {
        Self {
            entity_name,
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn indexed_fields(&self) -> impl Iterator<Item = &'static FieldModel> {
        self.fields.iter().filter(|field| field.indexed)
    }

    /// Check the naming rules that store keys rely on.
    ///
    /// Names are non-empty and free of the key separator; field names are unique.
    pub fn validate(&self) -> Result<(), String> {
        check_name("entity", self.entity_name)?;

        for (i, field) in self.fields.iter().enumerate() {
            check_name("field", field.name)?;

            if self.fields[..i].iter().any(|prev| prev.name == field.name) {
                return Err(format!(
                    "entity '{}' declares field '{}' twice",
                    self.entity_name, field.name
                ));
            }
        }

        Ok(())
    }
}

fn check_name(label: &str, name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{label} name must not be empty"));
    }
    if name.contains(KEY_SEPARATOR) {
        return Err(format!(
            "{label} name '{name}' must not contain '{KEY_SEPARATOR}'"
        ));
    }

    Ok(())
}
