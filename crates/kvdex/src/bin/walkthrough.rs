//! Create, find, update, and delete one record against the in-memory store,
//! then print the metrics report.
//!
//! Usage: `walkthrough [CONFIG.toml]`

use kvdex::{ErrorKind, ErrorOrigin, core::obs::metrics_report, prelude::*};
use std::{env, path::PathBuf, process::ExitCode};

///
/// Person
///

#[derive(Debug)]
struct Person {
    first_name: String,
    age: i64,
}

const PERSON_FIELDS: [FieldModel; 2] = [
    FieldModel::indexed("FirstName", FieldKind::Text),
    FieldModel::indexed("Age", FieldKind::Int),
];

const PERSON_MODEL: EntityModel = EntityModel::new("Person", &PERSON_FIELDS);

impl EntityKind for Person {
    const MODEL: &'static EntityModel = &PERSON_MODEL;

    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "FirstName" => Some(self.first_name.as_str().into()),
            "Age" => Some(self.age.into()),
            _ => None,
        }
    }

    fn from_row(row: &Row) -> Result<Self, CodecError> {
        Ok(Self {
            first_name: row.text("FirstName")?,
            age: row.int("Age")?,
        })
    }
}

fn run() -> Result<(), Error> {
    let config = env::args_os().nth(1).map(PathBuf::from);
    let session = kvdex::open(MemoryStore::new(), config.as_deref())?;

    let key = session.create(&Person {
        first_name: "Bob".to_string(),
        age: 35,
    })?;
    println!("created {key}");

    for (key, person) in session.load_by_field::<Person>("FirstName", "Bob")? {
        println!("FirstName = Bob: {key} {person:?}");
    }

    let person = session.update(&key, |p: &mut Person| p.age = 36)?;
    println!("updated {key} {person:?}");

    for (key, person) in session.load_by_range::<Person>("Age", 0.0, 65.0)? {
        println!("Age in [0, 65]: {key} {person:?}");
    }

    let deleted = session.delete::<Person>(&key)?;
    let remaining = session.load_by_field::<Person>("FirstName", "Bob")?.len();
    println!("deleted {key}: {deleted}, remaining Bobs: {remaining}");

    let report = serde_json::to_string_pretty(&metrics_report())
        .map_err(|err| Error::new(ErrorKind::Internal, ErrorOrigin::Session, err.to_string()))?;
    println!("{report}");

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("walkthrough: {}:{}: {err}", err.origin, err.kind);
            ExitCode::FAILURE
        }
    }
}
