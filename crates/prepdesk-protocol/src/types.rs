//! Core protocol types for prepdesk.
//!
//! Two families of types live here:
//!
//! - **Identity records** ([`UserId`], [`Identity`], [`AccessToken`]) that
//!   the session layer holds in memory and persists to local storage.
//! - **Auth wire bodies** ([`LoginRequest`], [`RegisterRequest`],
//!   [`TokenResponse`], [`ErrorBody`]) exchanged with the authentication
//!   service over HTTP.
//!
//! Field names follow the backend's snake_case JSON, so these structs
//! serialize to exactly what the service expects.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The backend-assigned identifier of a user.
///
/// A newtype wrapper around `String`: you can't accidentally pass a
/// password or display name where a `UserId` is expected, even though all
/// three are strings underneath.
///
/// `#[serde(transparent)]` serializes this as the bare string, so
/// `UserId("alice")` is `"alice"` in JSON, not `{"0":"alice"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The authenticated principal's minimal profile.
///
/// `user_id` is immutable once issued. `display_name` is unknown after a
/// plain login and filled in by registration or a later profile edit.
///
/// The JSON shape is `{"user_id": "...", "name": "..."}`, with `name`
/// omitted when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,

    #[serde(
        rename = "name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

impl Identity {
    /// Creates an identity whose display name is not yet known.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: None,
        }
    }

    /// Builder-style setter for the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name to show in a header or avatar: the display name when known,
    /// otherwise the user id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.user_id.as_str())
    }
}

/// An opaque access token issued by the authentication service.
///
/// The client never interprets it; it is stored and forwarded as-is.
/// `Debug` is hand-written so tokens never end up in log output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building an `Authorization` header or
    /// persisting it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the raw token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Auth wire bodies
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user_id: UserId,
    pub password: String,
}

// Passwords stay out of Debug output, same as tokens.
impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /auth/register`.
///
/// `contact_handle` travels as `whatsapp`, the name the backend uses for
/// the user's contact number.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub user_id: UserId,
    pub password: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "whatsapp")]
    pub contact_handle: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Successful response of both auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: AccessToken,

    /// Always `"bearer"` today. Older servers omit it.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Error body returned by the service on non-2xx responses:
/// `{"detail": "Invalid credentials"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(all(test, feature = "json"))]
mod tests {
    //! The auth service and previously persisted records define exact
    //! JSON shapes. These tests pin them down.

    use super::*;

    // =====================================================================
    // UserId / Identity
    // =====================================================================

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::from("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }

    #[test]
    fn test_identity_without_name_omits_field() {
        let json =
            serde_json::to_value(Identity::new(UserId::from("alice"))).unwrap();

        assert_eq!(json["user_id"], "alice");
        assert!(json.get("name").is_none(), "absent name must be omitted");
    }

    #[test]
    fn test_identity_deserializes_record_from_web_client() {
        // Shape the browser client stored in local storage.
        let identity: Identity =
            serde_json::from_str(r#"{"user_id":"bob","name":"Bob B."}"#)
                .unwrap();

        assert_eq!(identity.user_id, UserId::from("bob"));
        assert_eq!(identity.display_name.as_deref(), Some("Bob B."));
    }

    #[test]
    fn test_identity_label_falls_back_to_user_id() {
        let anon = Identity::new(UserId::from("carol"));
        let named = anon.clone().with_display_name("Carol");

        assert_eq!(anon.label(), "carol");
        assert_eq!(named.label(), "Carol");
    }

    // =====================================================================
    // AccessToken
    // =====================================================================

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-jwt");
        let debug = format!("{token:?}");

        assert!(!debug.contains("secret-jwt"));
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let req = LoginRequest {
            user_id: UserId::from("alice"),
            password: "hunter2".into(),
        };

        let debug = format!("{req:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    // =====================================================================
    // Wire bodies
    // =====================================================================

    #[test]
    fn test_register_request_uses_backend_field_names() {
        let req = RegisterRequest {
            user_id: UserId::from("bob"),
            password: "pw".into(),
            display_name: "Bob B.".into(),
            contact_handle: "+1555".into(),
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["user_id"], "bob");
        assert_eq!(json["password"], "pw");
        assert_eq!(json["name"], "Bob B.");
        assert_eq!(json["whatsapp"], "+1555");
    }

    #[test]
    fn test_token_response_defaults_token_type() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();

        assert_eq!(resp.access_token.expose(), "abc");
        assert_eq!(resp.token_type, "bearer");
    }

    #[test]
    fn test_error_body_parses_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":"Invalid credentials"}"#)
                .unwrap();

        assert_eq!(body.detail, "Invalid credentials");
    }
}
