//! Single source of truth for who is signed in.
//!
//! The context owns the session store and an identity provider, publishes
//! [`AuthSnapshot`]s over a `tokio::sync::watch` channel, and resolves
//! overlapping operations with sequence numbers: each login, registration,
//! logout or restore takes the next number when issued, and its outcome is
//! applied only while that number is still the latest issued. Older
//! outcomes are dropped without touching state or storage.
//!
//! Persistence happens inside the same watch critical section that
//! publishes the new snapshot, so observers never see a state the store
//! disagrees with.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::auth_state::{AuthSnapshot, AuthStatus};
use super::localization::Locale;
use super::ports::{AuthError, AuthenticatedSession, IdentityProvider, SessionLiveness};
use super::session_store::SessionStore;
use super::{CredentialsValidationError, Identity, LoginCredentials, Registration, Role};

#[derive(Debug, Clone, Default)]
struct ContextState {
    snapshot: AuthSnapshot,
    issued: u64,
}

enum Restore {
    Keep(Identity),
    Empty,
    Discard,
}

/// Authentication state holder shared by the application via `Arc`.
pub struct AuthContext {
    provider: Arc<dyn IdentityProvider>,
    store: SessionStore,
    locale: Locale,
    state: watch::Sender<ContextState>,
}

/// Receiver half handed to views that re-render on auth changes.
#[derive(Debug, Clone)]
pub struct AuthSubscription {
    receiver: watch::Receiver<ContextState>,
}

impl AuthSubscription {
    /// Latest published snapshot.
    pub fn current(&self) -> AuthSnapshot {
        self.receiver.borrow().snapshot.clone()
    }

    /// Wait for the next change. Returns `None` once the context is dropped.
    pub async fn changed(&mut self) -> Option<AuthSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().snapshot.clone())
    }
}

impl AuthContext {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: SessionStore, locale: Locale) -> Self {
        let (state, _) = watch::channel(ContextState::default());
        Self {
            provider,
            store,
            locale,
            state,
        }
    }

    /// Restore the persisted session and leave `Initializing`.
    ///
    /// A restored session is checked with the provider. Expired or rejected
    /// sessions are cleared; when the provider cannot be reached the stored
    /// session is kept.
    pub async fn initialize(&self) -> AuthSnapshot {
        let seq = self.issue();
        let restore = match self.store.load_session() {
            None => Restore::Empty,
            Some(session) => {
                match self
                    .provider
                    .check_session(&session.identity, &session.token)
                    .await
                {
                    Ok(SessionLiveness::Live) => Restore::Keep(session.identity),
                    Ok(SessionLiveness::Expired) => {
                        info!(user = %session.identity.id(), "stored session expired");
                        Restore::Discard
                    }
                    Err(AuthError::Network { message }) => {
                        warn!(
                            user = %session.identity.id(),
                            error = %message,
                            "session check unreachable; keeping stored session"
                        );
                        Restore::Keep(session.identity)
                    }
                    Err(err) => {
                        warn!(
                            user = %session.identity.id(),
                            code = err.code(),
                            error = %err,
                            "stored session rejected"
                        );
                        Restore::Discard
                    }
                }
            }
        };

        let applied = self.settle(seq, |snapshot| {
            snapshot.status = match restore {
                Restore::Keep(identity) => AuthStatus::Authenticated(identity),
                Restore::Empty => AuthStatus::Anonymous,
                Restore::Discard => {
                    if let Err(err) = self.store.clear() {
                        warn!(error = %err, "failed to clear rejected session");
                    }
                    AuthStatus::Anonymous
                }
            };
        });
        if applied.is_none() {
            debug!(seq, "session restore superseded");
        }
        self.snapshot()
    }

    /// Sign in with email and password.
    ///
    /// `role` only applies when the authority has no role on record.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> Result<Identity, AuthError> {
        let credentials =
            LoginCredentials::try_from_parts(email, password).map_err(login_validation_error)?;
        let seq = self.issue();
        let outcome = self.provider.authenticate(&credentials, role).await;
        self.finish_sign_in(seq, outcome).await
    }

    /// Create an account and sign in as it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Identity, AuthError> {
        let registration = Registration::try_from_parts(name, email, password, role)
            .map_err(registration_validation_error)?;
        let seq = self.issue();
        let outcome = self.provider.register(&registration).await;
        self.finish_sign_in(seq, outcome).await
    }

    /// Sign out remotely, then clear the stored session.
    ///
    /// The context ends `Anonymous` whether or not the remote sign-out
    /// succeeds. A local storage failure is still reported, and the store
    /// stops handing out the surviving session.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let seq = self.issue();
        if let Some(token) = self.store.token() {
            self.provider.sign_out(&token).await;
        }
        let cleared = self.settle(seq, |snapshot| {
            snapshot.status = AuthStatus::Anonymous;
            self.store.clear()
        });
        match cleared {
            Some(Ok(())) => {
                info!("signed out");
                Ok(())
            }
            Some(Err(err)) => {
                warn!(error = %err, "signed out but stored session could not be removed");
                Err(AuthError::storage(err.to_string()))
            }
            None => {
                debug!(seq, "logout superseded");
                Err(AuthError::superseded())
            }
        }
    }

    /// Replace the signed-in identity's avatar and persist it.
    pub fn set_avatar(&self, avatar: Option<String>) -> Result<Identity, AuthError> {
        let mut outcome = Err(AuthError::unauthenticated());
        self.state.send_if_modified(|state| {
            let AuthStatus::Authenticated(current) = &state.snapshot.status else {
                return false;
            };
            let Some(token) = self.store.token() else {
                return false;
            };
            let updated = current.clone().with_avatar(avatar);
            if let Err(err) = self.store.save(&updated, &token) {
                outcome = Err(AuthError::storage(err.to_string()));
                return false;
            }
            state.snapshot.status = AuthStatus::Authenticated(updated.clone());
            outcome = Ok(updated);
            true
        });
        outcome
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().snapshot.clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.snapshot().identity().cloned()
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.state.subscribe(),
        }
    }

    /// User-facing message for `err` in the configured locale.
    pub fn describe(&self, err: &AuthError) -> &'static str {
        self.locale.describe_auth(err)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.store
    }

    fn issue(&self) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|state| {
            state.issued += 1;
            seq = state.issued;
            state.snapshot.loading = true;
        });
        seq
    }

    /// Apply `apply` and clear `loading` if `seq` is still the latest issued.
    ///
    /// `apply` runs while the watch lock is held, including any blocking
    /// session-store I/O it performs, so no snapshot is published ahead of
    /// the write that backs it.
    fn settle<T>(&self, seq: u64, apply: impl FnOnce(&mut AuthSnapshot) -> T) -> Option<T> {
        let mut applied = None;
        self.state.send_if_modified(|state| {
            if state.issued != seq {
                return false;
            }
            state.snapshot.loading = false;
            applied = Some(apply(&mut state.snapshot));
            true
        });
        applied
    }

    async fn finish_sign_in(
        &self,
        seq: u64,
        outcome: Result<AuthenticatedSession, AuthError>,
    ) -> Result<Identity, AuthError> {
        let session = match outcome {
            Ok(session) => session,
            Err(err) => {
                // Settling over `Initializing` supersedes the pending restore,
                // so its stored session goes too.
                let applied = self.settle(seq, |snapshot| {
                    if snapshot.is_initializing() {
                        if let Err(clear_err) = self.store.clear() {
                            warn!(error = %clear_err, "failed to clear superseded session");
                        }
                        snapshot.status = AuthStatus::Anonymous;
                    }
                });
                if applied.is_none() {
                    debug!(seq, code = err.code(), "failed sign-in superseded");
                }
                return Err(err);
            }
        };

        let applied = self.settle(seq, |snapshot| {
            match self.store.save(&session.identity, &session.token) {
                Ok(()) => {
                    snapshot.status = AuthStatus::Authenticated(session.identity.clone());
                    Ok(())
                }
                Err(err) => {
                    if let Err(clear_err) = self.store.clear() {
                        warn!(error = %clear_err, "failed to clear partial session");
                    }
                    snapshot.status = AuthStatus::Anonymous;
                    Err(AuthError::storage(err.to_string()))
                }
            }
        });

        match applied {
            Some(Ok(())) => {
                info!(
                    user = %session.identity.id(),
                    role = %session.identity.role(),
                    token = %session.token.fingerprint(),
                    "signed in"
                );
                Ok(session.identity)
            }
            Some(Err(err)) => {
                warn!(error = %err, "session could not be persisted; signing out");
                self.provider.sign_out(&session.token).await;
                Err(err)
            }
            None => {
                debug!(
                    seq,
                    token = %session.token.fingerprint(),
                    "sign-in superseded; revoking its session"
                );
                self.provider.sign_out(&session.token).await;
                Err(AuthError::superseded())
            }
        }
    }
}

fn login_validation_error(err: CredentialsValidationError) -> AuthError {
    match err {
        CredentialsValidationError::InvalidEmail => AuthError::invalid_email(),
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::WeakPassword { .. }
        | CredentialsValidationError::InvalidName(_) => AuthError::invalid_credentials(),
    }
}

fn registration_validation_error(err: CredentialsValidationError) -> AuthError {
    match err {
        CredentialsValidationError::InvalidEmail => AuthError::invalid_email(),
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::WeakPassword { .. } => {
            AuthError::weak_password(err.to_string())
        }
        CredentialsValidationError::InvalidName(inner) => AuthError::invalid_name(inner.to_string()),
    }
}

#[cfg(test)]
#[path = "auth_context_tests.rs"]
mod tests;
