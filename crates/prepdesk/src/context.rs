//! `SessionContext` builder and shared handle.
//!
//! The context is built once at process start and cloned into every
//! consumer that needs the session (route guards, the API client, a
//! navigation header). All clones share one [`SessionManager`].

use std::path::PathBuf;
use std::sync::Arc;

use prepdesk_protocol::{AccessToken, Identity};
use prepdesk_session::{
    SessionConfig, SessionError, SessionManager, SessionState,
    StaleResponsePolicy,
};
use prepdesk_storage::{FileStore, KeyValueStore};
use prepdesk_transport::{AuthService, HttpAuthService};
use tokio::sync::watch;

use crate::{ClientConfig, PrepdeskError};

/// Builder for the production [`SessionContext`].
///
/// # Example
///
/// ```rust,no_run
/// use prepdesk::prelude::*;
///
/// # fn run() -> Result<(), PrepdeskError> {
/// let context = SessionContext::builder()
///     .api_base_url("https://api.prepdesk.example")
///     .storage_dir("/var/lib/prepdesk")
///     .build()?;
///
/// if let Some(identity) = context.identity() {
///     println!("signed in as {}", identity.label());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionContextBuilder {
    config: ClientConfig,
}

impl SessionContextBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting with `config`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn api_base_url(mut self, url: &str) -> Self {
        self.config.api_base_url = url.to_string();
        self
    }

    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = Some(dir.into());
        self
    }

    pub fn stale_responses(mut self, policy: StaleResponsePolicy) -> Self {
        self.config.stale_responses = policy;
        self
    }

    /// Validates the configuration, opens the file store, and restores
    /// whatever session the previous process left behind.
    pub fn build(self) -> Result<SessionContext, PrepdeskError> {
        self.config.validate()?;

        let auth = HttpAuthService::new(
            &self.config.api_base_url,
            self.config.request_timeout(),
        )?;
        let dir = self.config.resolve_storage_dir()?;
        let store = FileStore::open(&dir)?;

        tracing::debug!(
            api = %self.config.api_base_url,
            storage = %dir.display(),
            "building session context"
        );

        Ok(SessionContext::from_parts(
            auth,
            store,
            self.config.session_config(),
        )?)
    }
}

/// Cheaply cloneable handle to the process-wide session.
pub struct SessionContext<A = HttpAuthService, S = FileStore> {
    manager: Arc<SessionManager<A, S>>,
}

impl SessionContext {
    /// Creates a new builder.
    pub fn builder() -> SessionContextBuilder {
        SessionContextBuilder::new()
    }
}

impl<A: AuthService, S: KeyValueStore> SessionContext<A, S> {
    /// Assembles a context from explicit collaborators. Tests and
    /// embedders with their own store or auth service start here.
    pub fn from_parts(
        auth: A,
        store: S,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let manager = SessionManager::restore(auth, store, config)?;
        Ok(Self {
            manager: Arc::new(manager),
        })
    }

    /// The shared manager, for login, register and logout.
    pub fn session(&self) -> &SessionManager<A, S> {
        &self.manager
    }

    pub fn state(&self) -> SessionState {
        self.manager.state()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.manager.identity()
    }

    pub fn token(&self) -> Option<AccessToken> {
        self.manager.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.manager.is_authenticated()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.manager.subscribe()
    }
}

impl<A, S> Clone for SessionContext<A, S> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

#[cfg(test)]
mod tests {
    use prepdesk_protocol::UserId;
    use prepdesk_storage::MemoryStore;

    use super::*;

    fn http() -> HttpAuthService {
        HttpAuthService::new("http://127.0.0.1:9", std::time::Duration::from_secs(1))
            .unwrap()
    }

    #[test]
    fn test_from_parts_restores_persisted_session() {
        let store = MemoryStore::new();
        store.set("user", r#"{"user_id":"alice","name":"Alice"}"#).unwrap();
        store.set("token", "jwt-alice").unwrap();

        let ctx =
            SessionContext::from_parts(http(), store, SessionConfig::default())
                .unwrap();

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.identity().unwrap().user_id, UserId::from("alice"));
        assert_eq!(ctx.token().unwrap().expose(), "jwt-alice");
    }

    #[test]
    fn test_clone_shares_manager() {
        let store = MemoryStore::new();
        store.set("user", r#"{"user_id":"alice"}"#).unwrap();
        store.set("token", "jwt").unwrap();
        let ctx =
            SessionContext::from_parts(http(), store, SessionConfig::default())
                .unwrap();
        let other = ctx.clone();

        ctx.session().logout().unwrap();

        assert!(!other.is_authenticated());
    }

    #[test]
    fn test_builder_build_creates_storage_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("prepdesk");

        let ctx = SessionContext::builder().storage_dir(&dir).build().unwrap();

        assert!(dir.is_dir());
        assert_eq!(ctx.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_builder_build_rejects_invalid_config() {
        let tmp = tempfile::tempdir().unwrap();

        let result = SessionContext::builder()
            .api_base_url("localhost:8000")
            .storage_dir(tmp.path())
            .build();

        assert!(matches!(result, Err(PrepdeskError::Config(_))));
    }
}
