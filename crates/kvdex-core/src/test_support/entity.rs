use crate::{
    db::{CodecError, Row},
    model::{
        entity::EntityModel,
        field::{FieldKind, FieldModel},
    },
    traits::EntityKind,
    value::Value,
};

///
/// Person
///
/// Shared test entity: two indexed text fields, one stored text field, and
/// one indexed field of each numeric kind.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Person {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) nickname: String,
    pub(crate) age: i64,
    pub(crate) height: f64,
}

const PERSON_FIELDS: [FieldModel; 5] = [
    FieldModel::indexed("FirstName", FieldKind::Text),
    FieldModel::indexed("LastName", FieldKind::Text),
    FieldModel::stored("Nickname", FieldKind::Text),
    FieldModel::indexed("Age", FieldKind::Int),
    FieldModel::indexed("Height", FieldKind::Float),
];

const PERSON_MODEL: EntityModel = EntityModel::new("Person", &PERSON_FIELDS);

impl Person {
    pub(crate) fn new(first_name: &str, last_name: &str, age: i64) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            nickname: String::new(),
            age,
            height: 1.75,
        }
    }
}

impl EntityKind for Person {
    const MODEL: &'static EntityModel = &PERSON_MODEL;

    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "FirstName" => Some(self.first_name.clone().into()),
            "LastName" => Some(self.last_name.clone().into()),
            "Nickname" => Some(self.nickname.clone().into()),
            "Age" => Some(self.age.into()),
            "Height" => Some(self.height.into()),
            _ => None,
        }
    }

    fn from_row(row: &Row) -> Result<Self, CodecError> {
        Ok(Self {
            first_name: row.text("FirstName")?,
            last_name: row.text("LastName")?,
            nickname: row.text("Nickname")?,
            age: row.int("Age")?,
            height: row.float("Height")?,
        })
    }
}

///
/// Pet
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Pet {
    pub(crate) name: String,
}

const PET_FIELDS: [FieldModel; 1] = [FieldModel::indexed("Name", FieldKind::Text)];

const PET_MODEL: EntityModel = EntityModel::new("Pet", &PET_FIELDS);

impl EntityKind for Pet {
    const MODEL: &'static EntityModel = &PET_MODEL;

    fn value(&self, field: &str) -> Option<Value> {
        (field == "Name").then(|| self.name.clone().into())
    }

    fn from_row(row: &Row) -> Result<Self, CodecError> {
        Ok(Self {
            name: row.text("Name")?,
        })
    }
}
