//! Durable persistence of the signed-in identity and its bearer token.
//!
//! Two keys are used: [`USER_KEY`] holds the identity as JSON and
//! [`TOKEN_KEY`] the raw token. Reads self-heal: a payload that cannot be
//! decoded, or an identity without its token, is deleted and reported as
//! absent. Reads never fail.
//!
//! When [`SessionStore::clear`] cannot remove the keys, the store remembers
//! the failure and reports no session from then on, so callers in this
//! process never pick up a session the user signed out of. A later
//! successful [`SessionStore::save`] or `clear` lifts the block.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use super::ports::{KeyValueStorage, StorageError};
use super::{Identity, SessionToken};

/// Storage key for the serialized identity.
pub const USER_KEY: &str = "agrotraceUser";
/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "agrotraceToken";

/// Identity and token restored together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub identity: Identity,
    pub token: SessionToken,
}

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    revoked: Arc<AtomicBool>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            revoked: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Persist `identity` and `token`, overwriting any previous pair.
    pub fn save(&self, identity: &Identity, token: &SessionToken) -> Result<(), StorageError> {
        let payload = serde_json::to_string(identity)
            .map_err(|err| StorageError::write(USER_KEY, err.to_string()))?;
        self.storage.set(USER_KEY, &payload)?;
        self.storage.set(TOKEN_KEY, token.expose())?;
        self.revoked.store(false, Ordering::SeqCst);
        debug!(
            user = %identity.id(),
            token = %token.fingerprint(),
            "session saved"
        );
        Ok(())
    }

    /// Previously saved identity, if present and well-formed.
    pub fn load(&self) -> Option<Identity> {
        self.load_session().map(|session| session.identity)
    }

    /// Previously saved identity and token, if both are present and valid.
    pub fn load_session(&self) -> Option<StoredSession> {
        if self.is_revoked() {
            return None;
        }
        let raw_user = self.read(USER_KEY);
        let raw_token = self.read(TOKEN_KEY);
        match (raw_user, raw_token) {
            (None, None) => None,
            (None, Some(_)) => {
                self.discard("token stored without an identity");
                None
            }
            (Some(_), None) => {
                self.discard("identity stored without a token");
                None
            }
            (Some(user), Some(token)) => {
                let identity = match serde_json::from_str::<Identity>(&user) {
                    Ok(identity) => identity,
                    Err(err) => {
                        self.discard(&format!("identity payload is malformed: {err}"));
                        return None;
                    }
                };
                let Ok(token) = SessionToken::new(token) else {
                    self.discard("stored token is blank");
                    return None;
                };
                Some(StoredSession { identity, token })
            }
        }
    }

    /// Current bearer token, if one is stored.
    pub fn token(&self) -> Option<SessionToken> {
        if self.is_revoked() {
            return None;
        }
        self.read(TOKEN_KEY)
            .and_then(|raw| SessionToken::new(raw).ok())
    }

    /// Remove both keys. Clearing an empty store succeeds.
    ///
    /// Both removals are attempted; the first failure is returned. After a
    /// failure the store reports no session until the next successful
    /// `save` or `clear`.
    pub fn clear(&self) -> Result<(), StorageError> {
        let user = self.storage.remove(USER_KEY);
        let token = self.storage.remove(TOKEN_KEY);
        let result = user.and(token);
        if result.is_err() {
            warn!("session keys survived clear; blocking the stale session");
        }
        self.revoked.store(result.is_err(), Ordering::SeqCst);
        result
    }

    fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "session storage read failed; treating as absent");
                None
            }
        }
    }

    fn discard(&self, reason: &str) {
        warn!(reason, "discarding persisted session");
        if let Err(err) = self.clear() {
            warn!(error = %err, "failed to clear persisted session");
        }
    }
}
