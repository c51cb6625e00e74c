//! HTTP authentication service using `reqwest`.

use std::time::Duration;

use prepdesk_protocol::{
    ErrorBody, LoginRequest, RegisterRequest, TokenResponse,
};
use reqwest::Client;
use serde_json::Value;

use crate::{AuthEndpoint, AuthService, TransportError};

/// An [`AuthService`] backed by the service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    base_url: String,
    client: Client,
}

impl HttpAuthService {
    /// Creates a service client for `base_url` (e.g.
    /// `"http://127.0.0.1:8000"`) with a per-request timeout.
    pub fn new(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;
        Self::with_client(base_url, client)
    }

    /// Uses an existing `reqwest::Client`, sharing its connection pool.
    pub fn with_client(
        base_url: &str,
        client: Client,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://")
            || base_url.starts_with("https://"))
        {
            return Err(TransportError::Config(format!(
                "base URL must start with http:// or https://, got {base_url:?}"
            )));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: serde::Serialize>(
        &self,
        endpoint: AuthEndpoint,
        body: &B,
    ) -> Result<TokenResponse, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        tracing::debug!(%endpoint, "sending auth request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                endpoint,
                source: Box::new(e),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            TransportError::Network {
                endpoint,
                source: Box::new(e),
            }
        })?;

        if !status.is_success() {
            let detail = rejection_detail(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
            tracing::debug!(%endpoint, status = status.as_u16(), %detail, "auth request rejected");
            return Err(TransportError::Rejected {
                endpoint,
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            TransportError::InvalidResponse {
                endpoint,
                message: e.to_string(),
            }
        })
    }
}

/// Pulls a human-readable reason out of an error body.
///
/// FastAPI sends `{"detail": "..."}` for `HTTPException`s but a list of
/// field errors for validation failures (422). Strings are used directly;
/// anything else is rendered back to compact JSON.
fn rejection_detail(body: &str) -> Option<String> {
    if let Ok(ErrorBody { detail }) = serde_json::from_str(body) {
        return Some(detail);
    }
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("detail").map(Value::to_string)
}

impl AuthService for HttpAuthService {
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<TokenResponse, TransportError> {
        self.post(AuthEndpoint::Login, request).await
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<TokenResponse, TransportError> {
        self.post(AuthEndpoint::Register, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_client_trims_trailing_slash() {
        let svc =
            HttpAuthService::with_client("http://localhost:8000/", Client::new())
                .unwrap();

        assert_eq!(svc.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_with_client_rejects_non_http_url() {
        let result = HttpAuthService::with_client("localhost:8000", Client::new());

        assert!(matches!(result, Err(TransportError::Config(_))));
    }

    #[test]
    fn test_rejection_detail_string() {
        assert_eq!(
            rejection_detail(r#"{"detail":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
    }

    #[test]
    fn test_rejection_detail_validation_list_rendered_as_json() {
        let detail =
            rejection_detail(r#"{"detail":[{"loc":["body","user_id"]}]}"#)
                .unwrap();

        assert!(detail.contains("user_id"));
    }

    #[test]
    fn test_rejection_detail_non_json_is_none() {
        assert_eq!(rejection_detail("<html>bad gateway</html>"), None);
    }
}
