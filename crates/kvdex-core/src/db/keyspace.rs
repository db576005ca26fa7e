use crate::{
    KEY_SEPARATOR,
    db::key::PrimaryKey,
    model::{entity::EntityModel, field::FieldModel},
};

///
/// Keyspace
///
/// Store key layout, optionally under a `<namespace>:` prefix:
///
/// - row:            `<entity>:<ulid>`
/// - text index:     `<entity>:<field>:<value>` (set of primary keys)
/// - numeric index:  `<entity>:<field>` (sorted set of primary keys)
///
/// Row ids are 26-character ULIDs and field names never contain the
/// separator, so the three families cannot collide.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Keyspace {
    prefix: String,
}

impl Keyspace {
    #[must_use]
    pub fn new(namespace: Option<&str>) -> Self {
        let prefix = namespace.map_or_else(String::new, |ns| format!("{ns}{KEY_SEPARATOR}"));

        Self { prefix }
    }

    #[must_use]
    pub fn row_key(&self, key: &PrimaryKey) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Prefix shared by every row key of an entity.
    #[must_use]
    pub fn row_prefix(&self, entity: &EntityModel) -> String {
        format!("{}{}{KEY_SEPARATOR}", self.prefix, entity.entity_name)
    }

    /// Recover the primary key from a row key produced by `row_key`.
    #[must_use]
    pub fn primary_key(&self, row_key: &str) -> Option<PrimaryKey> {
        let text = row_key.strip_prefix(&self.prefix)?;

        PrimaryKey::parse(text).ok()
    }

    #[must_use]
    pub fn text_index_key(&self, entity: &EntityModel, field: &FieldModel, value: &str) -> String {
        format!("{}{value}", self.text_index_prefix(entity, field))
    }

    /// Prefix shared by every value-set of one text field.
    #[must_use]
    pub fn text_index_prefix(&self, entity: &EntityModel, field: &FieldModel) -> String {
        format!(
            "{}{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}",
            self.prefix, entity.entity_name, field.name
        )
    }

    #[must_use]
    pub fn numeric_index_key(&self, entity: &EntityModel, field: &FieldModel) -> String {
        format!(
            "{}{}{KEY_SEPARATOR}{}",
            self.prefix, entity.entity_name, field.name
        )
    }
}
