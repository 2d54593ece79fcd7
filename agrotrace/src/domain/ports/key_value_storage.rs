//! Driven port for the client's persistent key-value storage.
//!
//! This is the analogue of browser local storage: string keys, string
//! values, synchronous access. The session store is its only writer.

use super::define_port_error;

define_port_error! {
    /// Errors raised by storage adapters.
    pub enum StorageError {
        /// The backing medium could not be read.
        Read { key: String, message: String } => "failed to read '{key}': {message}",
        /// The backing medium could not be written.
        Write { key: String, message: String } => "failed to write '{key}': {message}",
        /// A key was rejected by the adapter (for example a path separator).
        InvalidKey { key: String } => "storage key '{key}' is not allowed",
    }
}

/// Port for string key-value persistence.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStorage: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
