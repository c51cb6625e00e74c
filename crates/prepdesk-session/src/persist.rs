//! Storage adapter: moves a [`SessionState`] in and out of a
//! [`KeyValueStore`].
//!
//! Two keys are involved, the identity record and the token. Every method
//! here keeps them paired: after any call returns, storage holds either
//! both keys or neither (the one exception is a failed delete in
//! [`clear`](PersistedSession::clear), which is reported to the caller).

use prepdesk_protocol::{AccessToken, Codec, Identity, JsonCodec, ProtocolError};
use prepdesk_storage::{KeyValueStore, StorageError};

use crate::{SessionConfig, SessionError, SessionState};

/// The persisted half of a session.
#[derive(Debug)]
pub struct PersistedSession<S> {
    store: S,
    codec: JsonCodec,
    identity_key: String,
    token_key: String,
}

impl<S: KeyValueStore> PersistedSession<S> {
    pub fn new(store: S, config: &SessionConfig) -> Self {
        Self {
            store,
            codec: JsonCodec,
            identity_key: config.identity_key.clone(),
            token_key: config.token_key.clone(),
        }
    }

    /// Reads the persisted session.
    ///
    /// Half-written or unreadable state is treated as signed out: an
    /// identity without a token, a token without an identity, and an
    /// identity record that fails to decode all yield `Unauthenticated`,
    /// and the leftover keys are deleted so storage matches memory.
    ///
    /// # Errors
    /// Only a failing read is an error. The caller cannot know what is
    /// persisted, so it must not guess.
    pub fn load(&self) -> Result<SessionState, SessionError> {
        let record = self.store.get(&self.identity_key)?;
        let token = self.store.get(&self.token_key)?;

        let (record, token) = match (record, token) {
            (None, None) => return Ok(SessionState::Unauthenticated),
            (Some(record), Some(token)) if !token.is_empty() => (record, token),
            (record, token) => {
                tracing::warn!(
                    has_identity = record.is_some(),
                    has_token = token.is_some(),
                    "discarding half-persisted session"
                );
                self.discard();
                return Ok(SessionState::Unauthenticated);
            }
        };

        match self.decode_identity(&record) {
            Ok(identity) => {
                Ok(SessionState::authenticated(identity, AccessToken::new(token)))
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable identity record");
                self.discard();
                Ok(SessionState::Unauthenticated)
            }
        }
    }

    /// Writes a freshly authenticated identity and its token.
    ///
    /// The token is written first, then the identity. If the identity write
    /// fails, the token key is put back the way it was, so a failed call
    /// leaves storage unchanged.
    pub fn save(
        &self,
        identity: &Identity,
        token: &AccessToken,
    ) -> Result<(), SessionError> {
        let record = self.codec.encode_string(identity)?;
        let previous_token = self.store.get(&self.token_key)?;

        self.store.set(&self.token_key, token.expose())?;

        if let Err(e) = self.store.set(&self.identity_key, &record) {
            let rollback = match &previous_token {
                Some(previous) => self.store.set(&self.token_key, previous),
                None => self.store.remove(&self.token_key),
            };
            if let Err(rollback_err) = rollback {
                tracing::error!(
                    error = %rollback_err,
                    "failed to roll back token after identity write failed"
                );
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Rewrites only the identity record; the token key is untouched.
    pub fn save_identity(&self, identity: &Identity) -> Result<(), SessionError> {
        let record = self.codec.encode_string(identity)?;
        self.store.set(&self.identity_key, &record)?;
        Ok(())
    }

    /// Deletes both keys.
    ///
    /// Both deletes are always attempted, even if the first fails. The
    /// first error is returned.
    pub fn clear(&self) -> Result<(), StorageError> {
        let identity = self.store.remove(&self.identity_key);
        let token = self.store.remove(&self.token_key);
        identity.and(token)
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn decode_identity(&self, record: &str) -> Result<Identity, ProtocolError> {
        let identity: Identity = self.codec.decode(record.as_bytes())?;
        if identity.user_id.as_str().is_empty() {
            return Err(ProtocolError::InvalidRecord("empty user_id".into()));
        }
        Ok(identity)
    }

    fn discard(&self) {
        if let Err(e) = self.clear() {
            tracing::warn!(error = %e, "failed to discard stale session keys");
        }
    }
}
