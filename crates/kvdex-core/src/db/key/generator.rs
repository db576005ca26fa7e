use crate::db::key::{KeyError, PrimaryKey};
use std::sync::{Mutex, PoisonError};
use ulid::Generator;

///
/// KeyGenerator
///
/// Monotonic ULID source. Within one millisecond the random part is
/// incremented rather than redrawn, so keys from one generator never repeat.
///

#[derive(Default)]
pub struct KeyGenerator {
    inner: Mutex<Generator>,
}

impl KeyGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh key for an entity.
    pub fn new_key(&self, entity_name: &str) -> Result<PrimaryKey, KeyError> {
        // the generator holds only the previous id; a poisoned lock is still usable
        let mut generator = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = generator.generate().map_err(|_| KeyError::Overflow)?;

        Ok(PrimaryKey::new(entity_name, id))
    }
}
