//! Session types: the data structures that represent who is signed in.
//!
//! A "session" is the client's record of the current user. It pairs:
//! - WHO the user is ([`Identity`])
//! - HOW requests prove it ([`AccessToken`])
//!
//! The transitions on [`SessionState`] are pure: they build new values and
//! never touch storage. Persisting them is the job of
//! [`PersistedSession`](crate::PersistedSession).

use prepdesk_protocol::{AccessToken, Identity};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// What to do with a login/register response that arrives after a newer
/// session operation has started.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Apply every successful response as it resolves. With two
    /// overlapping logins, whichever resolves last wins, and a login that
    /// resolves after a logout signs the user back in.
    #[default]
    Apply,

    /// Drop responses that are no longer the newest operation. Each
    /// login/register takes a generation number and logout bumps it; a
    /// response whose generation is stale returns
    /// [`SessionError::Superseded`](crate::SessionError::Superseded).
    Discard,
}

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Storage key holding the serialized identity record.
    ///
    /// Default: `"user"`.
    pub identity_key: String,

    /// Storage key holding the raw access token.
    ///
    /// Default: `"token"`.
    pub token_key: String,

    /// Handling of overlapping login/register calls.
    pub stale_responses: StaleResponsePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            identity_key: "user".to_string(),
            token_key: "token".to_string(),
            stale_responses: StaleResponsePolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The current state of the client session.
///
/// ```text
///                  login / register (success)
///   Unauthenticated ───────────────────────────→ Authenticated
///         ↑                                        │    ↺ login / register
///         └──────────────── logout ────────────────┘      (replaces identity)
/// ```
///
/// The token lives inside the `Authenticated` variant, so a token without
/// an identity (or the reverse) cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nobody is signed in.
    #[default]
    Unauthenticated,

    /// A user is signed in.
    Authenticated {
        identity: Identity,
        token: AccessToken,
    },
}

impl SessionState {
    /// The state after a successful login or registration. Whatever was
    /// there before is replaced wholesale.
    pub fn authenticated(identity: Identity, token: AccessToken) -> Self {
        Self::Authenticated { identity, token }
    }

    /// The state after a profile edit changed the display name, or `None`
    /// if nobody is signed in.
    pub fn renamed(&self, display_name: impl Into<String>) -> Option<Self> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticated { identity, token } => Some(Self::Authenticated {
                identity: identity.clone().with_display_name(display_name),
                token: token.clone(),
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated { identity, .. } => Some(identity),
            Self::Unauthenticated => None,
        }
    }

    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Unauthenticated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use prepdesk_protocol::UserId;

    use super::*;

    fn alice() -> SessionState {
        SessionState::authenticated(
            Identity::new(UserId::from("alice")),
            AccessToken::new("jwt-alice"),
        )
    }

    #[test]
    fn test_default_state_is_unauthenticated() {
        let state = SessionState::default();

        assert!(!state.is_authenticated());
        assert!(state.identity().is_none());
        assert!(state.token().is_none());
    }

    #[test]
    fn test_authenticated_exposes_identity_and_token_together() {
        let state = alice();

        assert!(state.is_authenticated());
        assert_eq!(state.identity().unwrap().user_id, UserId::from("alice"));
        assert_eq!(state.token().unwrap().expose(), "jwt-alice");
    }

    #[test]
    fn test_renamed_keeps_token_and_user_id() {
        let renamed = alice().renamed("Alice A.").expect("signed in");

        assert_eq!(
            renamed.identity().unwrap().display_name.as_deref(),
            Some("Alice A.")
        );
        assert_eq!(renamed.identity().unwrap().user_id, UserId::from("alice"));
        assert_eq!(renamed.token(), alice().token());
    }

    #[test]
    fn test_renamed_unauthenticated_is_none() {
        assert!(SessionState::Unauthenticated.renamed("x").is_none());
    }

    #[test]
    fn test_session_config_default_keys() {
        let config = SessionConfig::default();

        assert_eq!(config.identity_key, "user");
        assert_eq!(config.token_key, "token");
        assert_eq!(config.stale_responses, StaleResponsePolicy::Apply);
    }
}
