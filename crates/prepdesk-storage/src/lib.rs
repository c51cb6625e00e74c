//! Durable key-value storage for prepdesk.
//!
//! The session layer persists exactly two string values: the serialized
//! identity record and the opaque access token. This crate provides the
//! small interface it writes through, plus two implementations:
//!
//! - [`MemoryStore`]: a shared in-process map, for tests and for clients
//!   that don't want anything to survive a restart.
//! - [`FileStore`]: one file per key under a directory, surviving process
//!   restarts the way browser local storage does.
//!
//! Calls are synchronous from the caller's point of view. The values are
//! tiny and the session manager writes them while holding its state lock,
//! which must never be held across an `.await`.

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// A string-keyed, string-valued persistent store.
///
/// `Send + Sync + 'static` because the store lives inside a session
/// manager that is shared across tasks behind an `Arc`.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads a key. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes a key. Deleting a key that doesn't exist succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
