//! Error types for the session layer.

use prepdesk_protocol::ProtocolError;
use prepdesk_storage::StorageError;
use prepdesk_transport::TransportError;

/// Errors that can occur while changing the session.
///
/// None of these are fatal. A failed `login`/`register` leaves the
/// previous session exactly as it was; a failed `logout` has already
/// cleared the in-memory session before reporting.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The authentication service was unreachable or refused the
    /// credentials.
    #[error("authentication failed: {0}")]
    AuthFailed(#[source] TransportError),

    /// Reading, writing or deleting a persisted key failed.
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The identity record could not be encoded.
    #[error("identity record invalid: {0}")]
    Codec(#[from] ProtocolError),

    /// The operation needs a signed-in user and there is none.
    #[error("no user is signed in")]
    NotAuthenticated,

    /// A newer login, register or logout started while this one was in
    /// flight, and the manager is configured to drop stale responses.
    #[error("superseded by a newer session operation")]
    Superseded,
}

impl SessionError {
    /// Returns `true` when the service refused the credentials (wrong
    /// password, user already exists), as opposed to a network or local
    /// failure. UIs use this to choose between "check your password" and
    /// "try again later".
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::AuthFailed(e) if e.is_rejected())
    }
}
