//! Wire types and records for prepdesk.
//!
//! This crate defines the "language" the client speaks, both to the
//! authentication service and to its own local storage:
//!
//! - **Types** ([`Identity`], [`AccessToken`], [`LoginRequest`], etc.):
//!   the records that get serialized.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those records are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits below both the transport (HTTP) and the
//! storage adapter. It doesn't know about connections or files; it only
//! knows how to serialize and deserialize records.
//!
//! ```text
//! Transport (HTTP) ─┐
//!                   ├→ Protocol (records) → Session (identity lifecycle)
//! Storage (keys)  ──┘
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AccessToken, ErrorBody, Identity, LoginRequest, RegisterRequest,
    TokenResponse, UserId,
};
