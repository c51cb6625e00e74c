use crate::AuthEndpoint;

/// Errors that can occur while talking to the authentication service.
///
/// The first three variants are the transport half of the session error
/// taxonomy: the service was unreachable, it said no, or it said yes in a
/// shape we could not read.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response: connection refused, DNS
    /// failure, timeout.
    #[error("{endpoint} unreachable: {source}")]
    Network {
        endpoint: AuthEndpoint,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The service answered with a non-2xx status.
    ///
    /// `detail` is the server's explanation when it sent one
    /// (`"Invalid credentials"`, `"User already exists"`), otherwise the
    /// status reason phrase.
    #[error("{endpoint} rejected ({status}): {detail}")]
    Rejected {
        endpoint: AuthEndpoint,
        status: u16,
        detail: String,
    },

    /// A 2xx response whose body was not a token response.
    #[error("{endpoint} returned an invalid response: {message}")]
    InvalidResponse {
        endpoint: AuthEndpoint,
        message: String,
    },

    /// The client itself could not be built (bad base URL, TLS setup).
    #[error("auth client misconfigured: {0}")]
    Config(String),
}

impl TransportError {
    /// Returns `true` when the service looked at the request and refused
    /// it, as opposed to the request never getting an answer.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns `true` for a 401, i.e. wrong user id or password.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }
}
