//! Driven port for a federated identity authority.
//!
//! The authority owns credentials only. Profile data (display name, role)
//! lives in a [`super::ProfileDirectory`], so registration spans two systems
//! and needs a compensating delete when the second write fails.

use async_trait::async_trait;

use crate::domain::{Email, LoginCredentials, Registration, SessionToken, UserId};

use super::AuthError;

/// Account handle issued by the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityAccount {
    pub uid: UserId,
    pub email: Email,
    pub token: SessionToken,
}

/// Port for credential storage and token issuance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityAuthority: Send + Sync {
    /// Create a credential record and sign it in.
    async fn create_account(&self, registration: &Registration)
    -> Result<AuthorityAccount, AuthError>;

    /// Verify credentials and issue a token.
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AuthorityAccount, AuthError>;

    /// Permanently delete an account created by [`IdentityAuthority::create_account`].
    async fn delete_account(&self, account: &AuthorityAccount) -> Result<(), AuthError>;
}
