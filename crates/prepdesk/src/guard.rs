//! Route guard for authenticated-only views.

use prepdesk_protocol::Identity;
use prepdesk_session::SessionState;
use prepdesk_storage::KeyValueStore;
use prepdesk_transport::AuthService;

use crate::SessionContext;

/// Where unauthenticated users are sent.
pub const LOGIN_ROUTE: &str = "/login";

/// Outcome of checking a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Render the view for this user.
    Granted(Identity),
    /// Navigate to this route instead.
    Redirect(&'static str),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Grants access when a session exists, otherwise redirects to
/// [`LOGIN_ROUTE`].
pub fn require_auth<A: AuthService, S: KeyValueStore>(
    context: &SessionContext<A, S>,
) -> Access {
    access_for(&context.state())
}

/// Same decision as [`require_auth`], for callers holding a state
/// snapshot (e.g. from a subscription).
pub fn access_for(state: &SessionState) -> Access {
    match state.identity() {
        Some(identity) => Access::Granted(identity.clone()),
        None => {
            tracing::debug!(to = LOGIN_ROUTE, "redirecting unauthenticated user");
            Access::Redirect(LOGIN_ROUTE)
        }
    }
}

#[cfg(test)]
mod tests {
    use prepdesk_protocol::{AccessToken, UserId};

    use super::*;

    #[test]
    fn test_access_for_unauthenticated_redirects_to_login() {
        assert_eq!(
            access_for(&SessionState::Unauthenticated),
            Access::Redirect("/login")
        );
    }

    #[test]
    fn test_access_for_authenticated_grants_identity() {
        let identity = Identity::new(UserId::from("alice"));
        let state =
            SessionState::authenticated(identity.clone(), AccessToken::new("t"));

        let access = access_for(&state);

        assert!(access.is_granted());
        assert_eq!(access, Access::Granted(identity));
    }
}
