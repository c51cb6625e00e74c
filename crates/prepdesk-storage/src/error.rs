//! Error types for the storage layer.

/// Errors that can occur while reading or writing persisted keys.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The underlying medium failed (disk full, permission denied, ...).
    #[error("storage I/O failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The key contains characters the store cannot represent.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// The store cannot be used at all right now, e.g. its lock was
    /// poisoned by a panicking writer.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
