//! File-per-key storage inside a capability-scoped directory.

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use super::atomic::write_atomic;
use crate::domain::ports::{KeyValueStorage, StorageError};

/// [`KeyValueStorage`] writing each key to its own file under one directory.
///
/// Keys must be plain file names: no separators, no parent references and
/// no leading dot (temporary files use that prefix).
#[derive(Debug)]
pub struct DirectoryStorage {
    root: Utf8PathBuf,
    dir: Dir,
}

impl DirectoryStorage {
    /// Open `root`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or opened.
    pub fn open(root: impl Into<Utf8PathBuf>) -> io::Result<Self> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
        debug!(root = %root, "opened storage directory");
        Ok(Self { root, dir })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

fn file_name(key: &str) -> Result<&str, StorageError> {
    let mut components = Utf8Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Utf8Component::Normal(name)), None)
            if name == key && !name.starts_with('.') && !name.contains('\\') =>
        {
            Ok(name)
        }
        _ => Err(StorageError::invalid_key(key)),
    }
}

impl KeyValueStorage for DirectoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let name = file_name(key)?;
        match self.dir.read_to_string(name) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::read(key, err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let name = file_name(key)?;
        write_atomic(&self.dir, name, value)
            .map_err(|err| StorageError::write(key, err.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let name = file_name(key)?;
        match self.dir.remove_file(name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::write(key, err.to_string())),
        }
    }
}
