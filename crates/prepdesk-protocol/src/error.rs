//! Error types for the protocol layer.
//!
//! Each prepdesk crate defines its own error enum. A `ProtocolError` always
//! means a record could not be turned into bytes or back, never that the
//! network or the disk misbehaved.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a hand-edited storage file, a record written by an
    /// incompatible client version, or a truncated response body.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The record decoded but violates a protocol rule, e.g. an empty
    /// user id.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
