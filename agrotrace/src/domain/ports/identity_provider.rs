//! Driving port for credential exchange with the identity authority.
//!
//! The auth context calls this port to turn credentials into an identity
//! and bearer token without knowing whether the authority is the custom
//! backend or a federated authority plus profile directory.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Identity, LoginCredentials, Registration, Role, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Failures surfaced by identity providers and the auth context.
    pub enum AuthError {
        /// Wrong password or unknown email.
        InvalidCredentials => "invalid email or password",
        /// Registration email already has an account.
        EmailInUse => "email address is already registered",
        /// Password does not meet the authority's strength rules.
        WeakPassword { message: String } => "password rejected: {message}",
        /// Email address is malformed.
        InvalidEmail => "email address is not valid",
        /// Display name is blank or too long.
        InvalidName { message: String } => "display name rejected: {message}",
        /// The authority is throttling attempts.
        RateLimited => "too many attempts; try again later",
        /// The operation needs an authenticated session.
        Unauthenticated => "no authenticated session",
        /// The authority could not be reached.
        Network { message: String } => "identity authority unreachable: {message}",
        /// The authority answered with an unexpected failure.
        Remote { message: String } => "identity authority error: {message}",
        /// The session could not be persisted locally.
        Storage { message: String } => "session storage failed: {message}",
        /// A later login, registration or logout was issued before this one resolved.
        Superseded => "a newer authentication request replaced this one",
    }
}

/// Identity and bearer token returned by a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub identity: Identity,
    pub token: SessionToken,
}

/// Result of a startup session-liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLiveness {
    /// The stored session may be used.
    Live,
    /// The authority no longer honours the stored token.
    Expired,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for an identity and token.
    ///
    /// `requested_role` is used only when the authority does not report a
    /// role of its own; see [`resolve_role`].
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
        requested_role: Role,
    ) -> Result<AuthenticatedSession, AuthError>;

    /// Create an account and return the new, already authenticated, identity.
    async fn register(&self, registration: &Registration)
    -> Result<AuthenticatedSession, AuthError>;

    /// Best-effort remote sign-out. Implementations log failures instead of
    /// returning them.
    async fn sign_out(&self, token: &SessionToken);

    /// Check that a session restored from storage is still honoured.
    async fn check_session(
        &self,
        _identity: &Identity,
        _token: &SessionToken,
    ) -> Result<SessionLiveness, AuthError> {
        Ok(SessionLiveness::Live)
    }
}

/// Pick the role for a freshly authenticated identity.
///
/// The authority's value wins whenever it reports one; the caller's choice
/// only fills the gap when the authority has no role on record.
pub fn resolve_role(authority_role: Option<Role>, requested_role: Role) -> Role {
    match authority_role {
        Some(role) => {
            if role != requested_role {
                debug!(
                    authority = %role,
                    requested = %requested_role,
                    "authority role overrides requested role"
                );
            }
            role
        }
        None => requested_role,
    }
}

/// In-memory provider accepting one fixed account.
///
/// `demo@agrotrace.test` / `password` signs in as a farmer named `Demo`.
/// Registration is refused so the fixture never pretends to persist.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

const FIXTURE_EMAIL: &str = "demo@agrotrace.test";
const FIXTURE_PASSWORD: &str = "password";

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
        requested_role: Role,
    ) -> Result<AuthenticatedSession, AuthError> {
        if credentials.email().as_ref() != FIXTURE_EMAIL
            || credentials.password() != FIXTURE_PASSWORD
        {
            return Err(AuthError::invalid_credentials());
        }
        let role = resolve_role(Some(Role::Farmer), requested_role);
        let identity = Identity::try_from_strings("fixture-farmer", FIXTURE_EMAIL, "Demo", role)
            .map_err(|err| AuthError::remote(format!("invalid fixture identity: {err}")))?;
        let token = SessionToken::new("fixture-token")
            .map_err(|err| AuthError::remote(format!("invalid fixture token: {err}")))?;
        Ok(AuthenticatedSession { identity, token })
    }

    async fn register(
        &self,
        _registration: &Registration,
    ) -> Result<AuthenticatedSession, AuthError> {
        Err(AuthError::remote("fixture provider does not create accounts"))
    }

    async fn sign_out(&self, _token: &SessionToken) {}
}
