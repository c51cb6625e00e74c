//! Authentication service abstraction for prepdesk.
//!
//! Provides the [`AuthService`] trait that the session layer calls to
//! exchange credentials for an access token, plus an HTTP implementation.
//!
//! # Feature Flags
//!
//! - `http` (default): [`HttpAuthService`] via `reqwest`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "http")]
mod http;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::HttpAuthService;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use prepdesk_protocol::{LoginRequest, RegisterRequest, TokenResponse};

/// The two endpoints of the authentication service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEndpoint {
    Login,
    Register,
}

impl AuthEndpoint {
    /// Path relative to the service base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
        }
    }
}

impl fmt::Display for AuthEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POST {}", self.path())
    }
}

/// Exchanges credentials for an access token.
///
/// The session manager only ever talks to this trait, so production code
/// uses [`HttpAuthService`] while tests plug in a scripted mock that can
/// fail, succeed, or resolve out of order on demand.
///
/// Each call is a single attempt. Implementations must not retry.
pub trait AuthService: Send + Sync + 'static {
    /// Verifies an existing account's credentials.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<TokenResponse, TransportError>> + Send;

    /// Creates an account and signs it in.
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<TokenResponse, TransportError>> + Send;
}

/// Lets several owners share one service, e.g. a test holding on to its
/// mock while the manager uses it too.
impl<T: AuthService> AuthService for Arc<T> {
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<TokenResponse, TransportError>> + Send
    {
        T::login(self, request)
    }

    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<TokenResponse, TransportError>> + Send
    {
        T::register(self, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_endpoint_paths() {
        assert_eq!(AuthEndpoint::Login.path(), "/auth/login");
        assert_eq!(AuthEndpoint::Register.path(), "/auth/register");
    }

    #[test]
    fn test_auth_endpoint_display() {
        assert_eq!(AuthEndpoint::Login.to_string(), "POST /auth/login");
    }

    #[test]
    fn test_rejected_error_classification() {
        let unauthorized = TransportError::Rejected {
            endpoint: AuthEndpoint::Login,
            status: 401,
            detail: "Invalid credentials".into(),
        };
        let conflict = TransportError::Rejected {
            endpoint: AuthEndpoint::Register,
            status: 400,
            detail: "User already exists".into(),
        };

        assert!(unauthorized.is_rejected());
        assert!(unauthorized.is_unauthorized());
        assert!(conflict.is_rejected());
        assert!(!conflict.is_unauthorized());
        assert!(conflict.to_string().contains("User already exists"));
    }

    #[test]
    fn test_network_error_is_not_rejected() {
        let err = TransportError::Network {
            endpoint: AuthEndpoint::Login,
            source: "connection refused".into(),
        };

        assert!(!err.is_rejected());
        assert!(err.to_string().contains("connection refused"));
    }
}
