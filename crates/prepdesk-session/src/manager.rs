//! The session manager: mediates every identity transition.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Restoring the session persisted by the previous process
//! - Exchanging credentials for a token (login, register)
//! - Persisting identity and token together, or not at all
//! - Clearing both on logout
//! - Publishing every transition to subscribers
//!
//! # Concurrency note
//!
//! Every operation takes `&self`, so one manager can be shared behind an
//! `Arc` by all consumers. The network round trip is the only suspension
//! point. Everything after it (the stale check, both storage writes and
//! the publish) runs inside one short synchronous critical section, so no
//! reader ever sees a half-updated session and a concurrent `logout`
//! cannot slip in between the write and the publish.
//!
//! Overlapping logins are NOT queued. Under
//! [`StaleResponsePolicy::Apply`] the last response to resolve wins; under
//! [`StaleResponsePolicy::Discard`] only the newest operation may commit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use prepdesk_protocol::{
    AccessToken, Identity, LoginRequest, RegisterRequest, UserId,
};
use prepdesk_storage::KeyValueStore;
use prepdesk_transport::AuthService;
use tokio::sync::watch;

use crate::{
    PersistedSession, SessionConfig, SessionError, SessionState,
    StaleResponsePolicy,
};

/// Owns the current session and the only code path allowed to change it.
///
/// ## Lifecycle
///
/// ```text
/// restore() ──→ [Unauthenticated] ──login()/register()──→ [Authenticated]
///                      ↑                                      │
///                      └───────────────logout()───────────────┘
/// ```
///
/// Generic over the authentication service `A` and the store `S` so tests
/// can run the real transition logic against scripted doubles.
pub struct SessionManager<A, S> {
    auth: A,
    persisted: PersistedSession<S>,

    /// Holds the current state and notifies subscribers when it changes.
    state: watch::Sender<SessionState>,

    /// Serializes the commit phase (storage writes + publish).
    commit: Mutex<()>,

    /// Bumped by every login, register and logout. Only consulted under
    /// [`StaleResponsePolicy::Discard`].
    generation: AtomicU64,

    config: SessionConfig,
}

impl<A: AuthService, S: KeyValueStore> SessionManager<A, S> {
    /// Builds a manager whose initial state is whatever the previous
    /// process persisted.
    ///
    /// A saved identity and token start the manager `Authenticated`. The
    /// token is not revalidated here; the first API call that uses it will
    /// find out if it expired.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the store cannot be read.
    pub fn restore(
        auth: A,
        store: S,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let persisted = PersistedSession::new(store, &config);
        let initial = persisted.load()?;

        match initial.identity() {
            Some(identity) => {
                tracing::info!(user_id = %identity.user_id, "restored persisted session");
            }
            None => tracing::debug!("no persisted session"),
        }

        let (state, _) = watch::channel(initial);
        Ok(Self {
            auth,
            persisted,
            state,
            commit: Mutex::new(()),
            generation: AtomicU64::new(0),
            config,
        })
    }

    // -----------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------

    /// Signs in an existing account.
    ///
    /// On success the new identity (display name unknown) and token
    /// replace any previous session, in storage and in memory.
    ///
    /// # Errors
    /// - [`SessionError::AuthFailed`]: service unreachable or credentials
    ///   refused
    /// - [`SessionError::Storage`]: the session could not be persisted
    /// - [`SessionError::Superseded`]: a newer operation started first
    ///   (only under [`StaleResponsePolicy::Discard`])
    ///
    /// On any error the previous session is left untouched.
    pub async fn login(
        &self,
        user_id: impl Into<UserId>,
        password: &str,
    ) -> Result<Identity, SessionError> {
        let request = LoginRequest {
            user_id: user_id.into(),
            password: password.to_string(),
        };
        let generation = self.begin();

        let response = self.auth.login(&request).await.map_err(|e| {
            tracing::warn!(user_id = %request.user_id, error = %e, "login failed");
            SessionError::AuthFailed(e)
        })?;

        self.commit(
            generation,
            Identity::new(request.user_id),
            response.access_token,
        )
    }

    /// Creates an account and signs it in.
    ///
    /// Same contract as [`login`](Self::login); the new identity also
    /// carries `display_name`. `contact_handle` is only sent to the
    /// service.
    pub async fn register(
        &self,
        user_id: impl Into<UserId>,
        password: &str,
        display_name: &str,
        contact_handle: &str,
    ) -> Result<Identity, SessionError> {
        let request = RegisterRequest {
            user_id: user_id.into(),
            password: password.to_string(),
            display_name: display_name.to_string(),
            contact_handle: contact_handle.to_string(),
        };
        let generation = self.begin();

        let response = self.auth.register(&request).await.map_err(|e| {
            tracing::warn!(user_id = %request.user_id, error = %e, "registration failed");
            SessionError::AuthFailed(e)
        })?;

        let identity =
            Identity::new(request.user_id).with_display_name(request.display_name);
        self.commit(generation, identity, response.access_token)
    }

    /// Signs out. Always ends `Unauthenticated`, even if storage fails.
    ///
    /// The in-memory session is cleared (and published) first, then both
    /// persisted keys are deleted. Calling this while already signed out
    /// is a no-op apart from re-deleting the keys.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if a key could not be deleted.
    /// The in-memory state is already `Unauthenticated` at that point.
    pub fn logout(&self) -> Result<(), SessionError> {
        let _commit = self.lock_commit();
        self.generation.fetch_add(1, Ordering::SeqCst);

        let mut ended = None;
        self.state.send_if_modified(|state| {
            match std::mem::take(state) {
                SessionState::Unauthenticated => false,
                SessionState::Authenticated { identity, .. } => {
                    ended = Some(identity.user_id);
                    true
                }
            }
        });
        if let Some(user_id) = ended {
            tracing::info!(%user_id, "session ended");
        }

        self.persisted.clear().map_err(|e| {
            tracing::warn!(error = %e, "failed to delete persisted session");
            SessionError::Storage(e)
        })
    }

    /// Changes the signed-in user's display name.
    ///
    /// Rewrites the identity record only; the token is untouched.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`] if nobody is signed in
    /// - [`SessionError::Storage`] if the record could not be written, in
    ///   which case the in-memory name is unchanged too
    pub fn update_display_name(
        &self,
        display_name: &str,
    ) -> Result<Identity, SessionError> {
        let _commit = self.lock_commit();

        let next = self
            .state
            .borrow()
            .renamed(display_name)
            .ok_or(SessionError::NotAuthenticated)?;
        let identity = next
            .identity()
            .cloned()
            .ok_or(SessionError::NotAuthenticated)?;

        self.persisted.save_identity(&identity)?;
        self.state.send_replace(next);
        tracing::info!(user_id = %identity.user_id, "display name updated");
        Ok(identity)
    }

    // -----------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// The current access token, if any.
    pub fn token(&self) -> Option<AccessToken> {
        self.state.borrow().token().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// A receiver that observes every published transition. Navigation
    /// headers and route guards hold one of these.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The storage adapter, mainly for inspection in tests and tools.
    pub fn persisted(&self) -> &PersistedSession<S> {
        &self.persisted
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Starts a login/register and returns its generation number.
    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commit phase shared by login and register.
    fn commit(
        &self,
        generation: u64,
        identity: Identity,
        token: AccessToken,
    ) -> Result<Identity, SessionError> {
        let _commit = self.lock_commit();

        if self.config.stale_responses == StaleResponsePolicy::Discard
            && self.generation.load(Ordering::SeqCst) != generation
        {
            tracing::debug!(
                user_id = %identity.user_id,
                generation,
                "dropping stale auth response"
            );
            return Err(SessionError::Superseded);
        }

        self.persisted.save(&identity, &token)?;
        self.state
            .send_replace(SessionState::authenticated(identity.clone(), token));

        tracing::info!(user_id = %identity.user_id, "session established");
        Ok(identity)
    }

    /// The guarded data is `()`, so a poisoned lock carries nothing to
    /// distrust; recover the guard and carry on.
    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        self.commit.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =========================================================================
// Tests
// =========================================================================
