//! Drives a session through the public API with a caller-supplied store.

use kvdex_core::{
    db::{DbSession, FieldMap, MemoryStore, Store, StoreError, StructureKind},
    error::ErrorClass,
    prelude::*,
};
use std::{
    collections::BTreeSet,
    sync::{Mutex, PoisonError},
};

///
/// Book
///

#[derive(Clone, Debug, PartialEq)]
struct Book {
    title: String,
    genre: String,
    pages: i64,
    rating: f64,
}

const BOOK_FIELDS: [FieldModel; 4] = [
    FieldModel::stored("Title", FieldKind::Text),
    FieldModel::indexed("Genre", FieldKind::Text),
    FieldModel::indexed("Pages", FieldKind::Int),
    FieldModel::indexed("Rating", FieldKind::Float),
];

const BOOK_MODEL: EntityModel = EntityModel::new("Book", &BOOK_FIELDS);

impl EntityKind for Book {
    const MODEL: &'static EntityModel = &BOOK_MODEL;

    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "Title" => Some(self.title.as_str().into()),
            "Genre" => Some(self.genre.as_str().into()),
            "Pages" => Some(self.pages.into()),
            "Rating" => Some(self.rating.into()),
            _ => None,
        }
    }

    fn from_row(row: &Row) -> Result<Self, kvdex_core::db::CodecError> {
        Ok(Self {
            title: row.text("Title")?,
            genre: row.text("Genre")?,
            pages: row.int("Pages")?,
            rating: row.float("Rating")?,
        })
    }
}

fn book(title: &str, genre: &str, pages: i64, rating: f64) -> Book {
    Book {
        title: title.to_string(),
        genre: genre.to_string(),
        pages,
        rating,
    }
}

///
/// LoggingStore
///
/// Forwards to a memory store and records the name of every call.
///

#[derive(Default)]
struct LoggingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<&'static str>>,
}

impl LoggingStore {
    fn log(&self, call: &'static str) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Store for LoggingStore {
    fn put_row(&self, key: &str, row: &FieldMap) -> Result<(), StoreError> {
        self.log("put_row");
        self.inner.put_row(key, row)
    }

    fn get_row(&self, key: &str) -> Result<Option<FieldMap>, StoreError> {
        self.log("get_row");
        self.inner.get_row(key)
    }

    fn delete_row(&self, key: &str) -> Result<bool, StoreError> {
        self.log("delete_row");
        self.inner.delete_row(key)
    }

    fn set_add(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        self.log("set_add");
        self.inner.set_add(set, member)
    }

    fn set_remove(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        self.log("set_remove");
        self.inner.set_remove(set, member)
    }

    fn set_members(&self, set: &str) -> Result<BTreeSet<String>, StoreError> {
        self.log("set_members");
        self.inner.set_members(set)
    }

    fn zset_upsert(&self, zset: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.log("zset_upsert");
        self.inner.zset_upsert(zset, member, score)
    }

    fn zset_remove(&self, zset: &str, member: &str) -> Result<bool, StoreError> {
        self.log("zset_remove");
        self.inner.zset_remove(zset, member)
    }

    fn zset_range(
        &self,
        zset: &str,
        low: f64,
        high: f64,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        self.log("zset_range");
        self.inner.zset_range(zset, low, high)
    }

    fn scan_prefix(&self, prefix: &str, kind: StructureKind) -> Result<Vec<String>, StoreError> {
        self.log("scan_prefix");
        self.inner.scan_prefix(prefix, kind)
    }
}

#[test]
fn create_writes_mapping_before_indexes() {
    let session = DbSession::new(LoggingStore::default());
    session
        .create(&book("Dune", "scifi", 412, 4.5))
        .expect("create");

    assert_eq!(
        session.store().take(),
        ["put_row", "set_add", "zset_upsert", "zset_upsert"]
    );
}

#[test]
fn update_touches_only_changed_fields() {
    let session = DbSession::new(LoggingStore::default());
    let key = session
        .create(&book("Dune", "scifi", 412, 4.5))
        .expect("create");
    session.store().take();

    session
        .update(&key, |b: &mut Book| b.rating = 4.8)
        .expect("update");
    assert_eq!(session.store().take(), ["get_row", "zset_upsert", "put_row"]);

    session
        .update(&key, |b: &mut Book| b.title = "Dune Messiah".to_string())
        .expect("update");
    assert_eq!(session.store().take(), ["get_row", "put_row"]);

    session
        .update(&key, |b: &mut Book| b.genre = "classic".to_string())
        .expect("update");
    assert_eq!(
        session.store().take(),
        ["get_row", "set_remove", "set_add", "put_row"]
    );
}

#[test]
fn delete_removes_indexes_before_mapping() {
    let session = DbSession::new(LoggingStore::default());
    let key = session
        .create(&book("Dune", "scifi", 412, 4.5))
        .expect("create");
    session.store().take();

    assert!(session.delete::<Book>(&key).expect("delete"));
    assert_eq!(
        session.store().take(),
        ["get_row", "set_remove", "zset_remove", "zset_remove", "delete_row"]
    );
}

#[test]
fn shelf_queries() {
    let session = DbSession::new(MemoryStore::new());
    let dune = session
        .create(&book("Dune", "scifi", 412, 4.5))
        .expect("create");
    session
        .create(&book("Emma", "classic", 474, 3.9))
        .expect("create");
    let hyperion = session
        .create(&book("Hyperion", "scifi", 482, 4.2))
        .expect("create");

    let scifi = session
        .load_by_field::<Book>("Genre", "scifi")
        .expect("by field");
    let mut keys = scifi.keys();
    keys.sort();
    let mut expected = vec![dune.clone(), hyperion.clone()];
    expected.sort();
    assert_eq!(keys, expected);

    let good = session
        .load_by_range::<Book>("Rating", 4.0, 5.0)
        .expect("by range");
    assert_eq!(good.keys(), vec![hyperion, dune]);

    let err = session
        .load_by_field::<Book>("Title", "Dune")
        .map(|_| ())
        .expect_err("title is not indexed");
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn keys_round_trip_through_text() {
    let session = DbSession::new(MemoryStore::new());
    let key = session
        .create(&book("Dune", "scifi", 412, 4.5))
        .expect("create");

    let text = key.to_string();
    assert!(text.starts_with("Book:"));

    let parsed: PrimaryKey = text.parse().expect("parse");
    assert_eq!(parsed, key);
    assert_eq!(
        session.load::<Book>(&parsed).expect("load"),
        book("Dune", "scifi", 412, 4.5)
    );
}
