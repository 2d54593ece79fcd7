//! [`crate::domain::ports::KeyValueStorage`] adapters.

mod atomic;
mod directory;
mod memory;

pub use directory::DirectoryStorage;
pub use memory::MemoryStorage;
