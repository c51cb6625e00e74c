//! Authenticated JSON client for the backend API.
//!
//! Views that call the backend go through [`ApiClient`], which forwards the
//! current session's token as `Authorization: Bearer <token>`. Requests
//! made while signed out go out without the header; the backend decides
//! what that means.

use prepdesk_protocol::ErrorBody;
use prepdesk_storage::{FileStore, KeyValueStore};
use prepdesk_transport::{AuthService, HttpAuthService};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ClientConfig, SessionContext};

/// Errors returned by [`ApiClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response. `detail` is the server's `{"detail": ...}` when
    /// present, else the reason phrase.
    #[error("{path} returned {status}: {detail}")]
    Status {
        path: String,
        status: u16,
        detail: String,
    },

    #[error("could not decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("API client misconfigured: {0}")]
    Config(String),
}

impl ApiError {
    /// The token was missing, expired or revoked.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

/// A JSON client bound to one [`SessionContext`].
pub struct ApiClient<A = HttpAuthService, S = FileStore> {
    base_url: String,
    client: Client,
    context: SessionContext<A, S>,
}

impl<A: AuthService, S: KeyValueStore> ApiClient<A, S> {
    pub fn new(
        context: SessionContext<A, S>,
        base_url: &str,
        client: Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            context,
        }
    }

    /// Builds a client using the configured base URL and timeout.
    pub fn from_config(
        context: SessionContext<A, S>,
        config: &ClientConfig,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self::new(context, &config.api_base_url, client))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        self.send(path, self.request(Method::GET, path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(path, self.request(Method::POST, path).json(body))
            .await
    }

    pub fn context(&self) -> &SessionContext<A, S> {
        &self.context
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match self.context.token() {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Network {
            path: path.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Network {
            path: path.to_string(),
            source,
        })?;

        if !status.is_success() {
            let detail = status_detail(status, &body);
            tracing::debug!(path, status = status.as_u16(), %detail, "API call failed");
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

fn status_detail(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_detail_prefers_server_detail() {
        assert_eq!(
            status_detail(StatusCode::FORBIDDEN, r#"{"detail":"Not your resume"}"#),
            "Not your resume"
        );
    }

    #[test]
    fn test_status_detail_falls_back_to_reason_phrase() {
        assert_eq!(
            status_detail(StatusCode::NOT_FOUND, "<html>nope</html>"),
            "Not Found"
        );
    }

    #[test]
    fn test_is_unauthorized_only_for_401() {
        let status = |status| ApiError::Status {
            path: "/x".into(),
            status,
            detail: String::new(),
        };

        assert!(status(401).is_unauthorized());
        assert!(!status(403).is_unauthorized());
    }
}
