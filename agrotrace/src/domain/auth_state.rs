//! Observable authentication state published by the auth context.

use super::identity::{Identity, Role};

/// Who, if anyone, is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthStatus {
    /// The persisted session has not been restored yet.
    #[default]
    Initializing,
    Anonymous,
    Authenticated(Identity),
}

/// Point-in-time view of the auth context.
///
/// `loading` is true while the most recently issued login, registration,
/// logout or restore is still pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub status: AuthStatus,
    pub loading: bool,
}

impl AuthSnapshot {
    pub fn identity(&self) -> Option<&Identity> {
        match &self.status {
            AuthStatus::Authenticated(identity) => Some(identity),
            AuthStatus::Initializing | AuthStatus::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.identity().map(Identity::role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn is_initializing(&self) -> bool {
        matches!(self.status, AuthStatus::Initializing)
    }
}
