//! Storage-facing runtime: codec, keys, index maintenance, and the session
//! that coordinates them against an injected [`Store`].

mod codec;
mod consistency;
mod index;
mod key;
mod keyspace;
mod response;
mod session;
mod store;

pub use codec::{CodecError, FieldMap, RecordCodec, Row};
pub use consistency::{IndexReport, ReadConsistency};
pub use index::IndexSet;
pub use key::{KeyError, KeyGenerator, PrimaryKey};
pub use keyspace::Keyspace;
pub use response::LoadResponse;
pub use session::DbSession;
pub use store::{MemoryStore, Store, StoreError, StructureKind};
