//! Driven port for user profile records kept beside the identity authority.

use async_trait::async_trait;

use crate::domain::{DisplayName, Email, Role, SessionToken, UserId};

use super::AuthError;

/// Profile stored for every registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub uid: UserId,
    pub email: Email,
    pub name: DisplayName,
    /// `None` for legacy records written before roles existed.
    pub role: Option<Role>,
}

/// Port for reading and writing user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Create the profile for a newly created account.
    async fn create_profile(
        &self,
        profile: &UserProfile,
        token: &SessionToken,
    ) -> Result<(), AuthError>;

    /// Fetch a profile; `Ok(None)` when the account has no profile record.
    async fn fetch_profile(
        &self,
        uid: &UserId,
        token: &SessionToken,
    ) -> Result<Option<UserProfile>, AuthError>;
}
