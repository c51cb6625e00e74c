//! Unified error type for the prepdesk client.

use prepdesk_protocol::ProtocolError;
use prepdesk_session::SessionError;
use prepdesk_storage::StorageError;
use prepdesk_transport::TransportError;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// Applications built on the `prepdesk` crate deal with this single type
/// instead of importing errors from each sub-crate. Each variant has a
/// `From` impl, so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PrepdeskError {
    /// Talking to the authentication service failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A record could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session transition failed (auth, persist, superseded).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Durable storage could not be opened or used.
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A call to the backend API failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use prepdesk_transport::AuthEndpoint;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Config("bad url".into());
        let prepdesk_err: PrepdeskError = err.into();
        assert!(matches!(prepdesk_err, PrepdeskError::Transport(_)));
        assert!(prepdesk_err.to_string().contains("bad url"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidRecord("empty user_id".into());
        let prepdesk_err: PrepdeskError = err.into();
        assert!(matches!(prepdesk_err, PrepdeskError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error_keeps_detail() {
        let err = SessionError::AuthFailed(TransportError::Rejected {
            endpoint: AuthEndpoint::Login,
            status: 401,
            detail: "Invalid credentials".into(),
        });
        let prepdesk_err: PrepdeskError = err.into();
        assert!(matches!(prepdesk_err, PrepdeskError::Session(_)));
        assert!(prepdesk_err.to_string().contains("Invalid credentials"));
    }

    #[test]
    fn test_from_storage_error() {
        let err = StorageError::InvalidKey("../etc".into());
        let prepdesk_err: PrepdeskError = err.into();
        assert!(matches!(prepdesk_err, PrepdeskError::Storage(_)));
    }

    #[test]
    fn test_from_config_error() {
        let err = ConfigError::Invalid("request_timeout_secs must be greater than 0".into());
        let prepdesk_err: PrepdeskError = err.into();
        assert!(matches!(prepdesk_err, PrepdeskError::Config(_)));
    }
}
