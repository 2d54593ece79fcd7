//! Process-local storage for tests and sessions that need no persistence.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::ports::{KeyValueStorage, StorageError};

/// [`KeyValueStorage`] held in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // Map updates cannot be observed half applied, so poisoning is harmless.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_removes_values() {
        let storage = MemoryStorage::new();
        storage.set("agrotraceToken", "tok").expect("set");
        assert_eq!(storage.get("agrotraceToken").expect("get").as_deref(), Some("tok"));

        storage.remove("agrotraceToken").expect("remove");
        storage.remove("agrotraceToken").expect("idempotent remove");
        assert_eq!(storage.get("agrotraceToken").expect("get"), None);
    }
}
