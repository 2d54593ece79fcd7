//! Identity provider composed of a federated authority and a profile directory.
//!
//! Registration writes to two systems. The authority account is created
//! first; if the profile write then fails the account is deleted again so a
//! retry with the same email is not blocked by a half-registered user.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use super::ports::{
    AuthError, AuthenticatedSession, IdentityAuthority, IdentityProvider, ProfileDirectory,
    SessionLiveness, UserProfile, resolve_role,
};
use super::{DisplayName, Identity, LoginCredentials, Registration, Role, SessionToken};

/// [`IdentityProvider`] over an [`IdentityAuthority`] and a [`ProfileDirectory`].
#[derive(Clone)]
pub struct FederatedIdentityProvider<A, D> {
    authority: Arc<A>,
    directory: Arc<D>,
}

impl<A, D> FederatedIdentityProvider<A, D> {
    pub fn new(authority: Arc<A>, directory: Arc<D>) -> Self {
        Self {
            authority,
            directory,
        }
    }
}

#[async_trait]
impl<A, D> IdentityProvider for FederatedIdentityProvider<A, D>
where
    A: IdentityAuthority,
    D: ProfileDirectory,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
        requested_role: Role,
    ) -> Result<AuthenticatedSession, AuthError> {
        let account = self.authority.sign_in(credentials).await?;
        let profile = self
            .directory
            .fetch_profile(&account.uid, &account.token)
            .await?;
        let (name, authority_role) = match profile {
            Some(profile) => (profile.name, profile.role),
            None => {
                debug!(uid = %account.uid, "no profile on record; deriving name from email");
                (DisplayName::from_email(&account.email), None)
            }
        };
        let role = resolve_role(authority_role, requested_role);
        Ok(AuthenticatedSession {
            identity: Identity::new(account.uid, account.email, name, role),
            token: account.token,
        })
    }

    async fn register(&self, registration: &Registration) -> Result<AuthenticatedSession, AuthError> {
        let account = self.authority.create_account(registration).await?;
        let profile = UserProfile {
            uid: account.uid.clone(),
            email: account.email.clone(),
            name: registration.name().clone(),
            role: Some(registration.role()),
        };

        if let Err(err) = self.directory.create_profile(&profile, &account.token).await {
            warn!(
                uid = %account.uid,
                code = err.code(),
                error = %err,
                "profile write failed; deleting authority account"
            );
            if let Err(undo) = self.authority.delete_account(&account).await {
                error!(
                    uid = %account.uid,
                    email = %account.email,
                    error = %undo,
                    "account rollback failed; authority account is orphaned"
                );
            }
            return Err(err);
        }

        debug!(uid = %account.uid, role = %registration.role(), "account registered");
        Ok(AuthenticatedSession {
            identity: Identity::new(
                account.uid,
                account.email,
                profile.name,
                registration.role(),
            ),
            token: account.token,
        })
    }

    async fn sign_out(&self, token: &SessionToken) {
        // Authority tokens are short-lived bearer JWTs with no revocation call.
        debug!(token = %token.fingerprint(), "federated sign-out is local only");
    }

    async fn check_session(
        &self,
        identity: &Identity,
        token: &SessionToken,
    ) -> Result<SessionLiveness, AuthError> {
        match self.directory.fetch_profile(identity.id(), token).await {
            Ok(_) => Ok(SessionLiveness::Live),
            Err(AuthError::Unauthenticated) => Ok(SessionLiveness::Expired),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the two-phase registration flow.

    use super::*;
    use crate::domain::ports::{AuthorityAccount, MockIdentityAuthority, MockProfileDirectory};
    use crate::domain::test_support::token;
    use crate::domain::{Email, UserId};
    use rstest::{fixture, rstest};

    fn account() -> AuthorityAccount {
        AuthorityAccount {
            uid: UserId::new("fb-uid-1").expect("uid"),
            email: Email::new("ana@x.com").expect("email"),
            token: token("id-token"),
        }
    }

    #[fixture]
    fn registration() -> Registration {
        Registration::try_from_parts("Ana", "ana@x.com", "123456", Role::Buyer)
            .expect("registration")
    }

    fn provider(
        authority: MockIdentityAuthority,
        directory: MockProfileDirectory,
    ) -> FederatedIdentityProvider<MockIdentityAuthority, MockProfileDirectory> {
        FederatedIdentityProvider::new(Arc::new(authority), Arc::new(directory))
    }

    #[rstest]
    #[tokio::test]
    async fn registration_writes_profile_with_requested_role(registration: Registration) {
        let mut authority = MockIdentityAuthority::new();
        authority
            .expect_create_account()
            .times(1)
            .returning(|_| Ok(account()));
        authority.expect_delete_account().times(0);
        let mut directory = MockProfileDirectory::new();
        directory
            .expect_create_profile()
            .withf(|profile, token| {
                profile.uid.as_ref() == "fb-uid-1"
                    && profile.name.as_ref() == "Ana"
                    && profile.role == Some(Role::Buyer)
                    && token.expose() == "id-token"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let session = provider(authority, directory)
            .register(&registration)
            .await
            .expect("registration");

        assert_eq!(session.identity.id().as_ref(), "fb-uid-1");
        assert_eq!(session.identity.name().as_ref(), "Ana");
        assert_eq!(session.identity.role(), Role::Buyer);
        assert_eq!(session.token.expose(), "id-token");
    }

    #[rstest]
    #[case::undo_succeeds(Ok(()))]
    #[case::undo_fails(Err(AuthError::network("authority down")))]
    #[tokio::test]
    async fn failed_profile_write_deletes_account(
        registration: Registration,
        #[case] undo: Result<(), AuthError>,
    ) {
        let mut authority = MockIdentityAuthority::new();
        authority
            .expect_create_account()
            .returning(|_| Ok(account()));
        authority
            .expect_delete_account()
            .withf(|acct| acct.uid.as_ref() == "fb-uid-1")
            .times(1)
            .return_once(move |_| undo);
        let mut directory = MockProfileDirectory::new();
        directory
            .expect_create_profile()
            .returning(|_, _| Err(AuthError::remote("permission denied")));

        let err = provider(authority, directory)
            .register(&registration)
            .await
            .expect_err("profile failure surfaces");

        assert_eq!(err, AuthError::remote("permission denied"));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_account_creation_skips_profile(registration: Registration) {
        let mut authority = MockIdentityAuthority::new();
        authority
            .expect_create_account()
            .returning(|_| Err(AuthError::email_in_use()));
        authority.expect_delete_account().times(0);
        let mut directory = MockProfileDirectory::new();
        directory.expect_create_profile().times(0);

        let err = provider(authority, directory)
            .register(&registration)
            .await
            .expect_err("duplicate email");

        assert_eq!(err, AuthError::EmailInUse);
    }

    #[rstest]
    #[case::profile_role_wins(Some(Role::Farmer), Role::Buyer, Role::Farmer)]
    #[case::legacy_profile_uses_request(None, Role::Buyer, Role::Buyer)]
    #[tokio::test]
    async fn login_prefers_profile_role(
        #[case] stored: Option<Role>,
        #[case] requested: Role,
        #[case] expected: Role,
    ) {
        let mut authority = MockIdentityAuthority::new();
        authority.expect_sign_in().returning(|_| Ok(account()));
        let mut directory = MockProfileDirectory::new();
        directory.expect_fetch_profile().returning(move |uid, _| {
            Ok(Some(UserProfile {
                uid: uid.clone(),
                email: Email::new("ana@x.com").expect("email"),
                name: DisplayName::new("Ana").expect("name"),
                role: stored,
            }))
        });
        let creds = LoginCredentials::try_from_parts("ana@x.com", "123456").expect("creds");

        let session = provider(authority, directory)
            .authenticate(&creds, requested)
            .await
            .expect("login");

        assert_eq!(session.identity.role(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn login_without_profile_derives_name() {
        let mut authority = MockIdentityAuthority::new();
        authority.expect_sign_in().returning(|_| Ok(account()));
        let mut directory = MockProfileDirectory::new();
        directory.expect_fetch_profile().returning(|_, _| Ok(None));
        let creds = LoginCredentials::try_from_parts("ana@x.com", "123456").expect("creds");

        let session = provider(authority, directory)
            .authenticate(&creds, Role::Farmer)
            .await
            .expect("login");

        assert_eq!(session.identity.name().as_ref(), "ana");
        assert_eq!(session.identity.role(), Role::Farmer);
    }

    #[rstest]
    #[case(Ok(None), Ok(SessionLiveness::Live))]
    #[case(Err(AuthError::unauthenticated()), Ok(SessionLiveness::Expired))]
    #[case(Err(AuthError::network("offline")), Err(AuthError::network("offline")))]
    #[tokio::test]
    async fn session_check_maps_directory_access(
        #[case] fetched: Result<Option<UserProfile>, AuthError>,
        #[case] expected: Result<SessionLiveness, AuthError>,
    ) {
        let mut directory = MockProfileDirectory::new();
        directory
            .expect_fetch_profile()
            .return_once(move |_, _| fetched);
        let identity = Identity::try_from_strings("fb-uid-1", "ana@x.com", "Ana", Role::Buyer)
            .expect("identity");

        let liveness = provider(MockIdentityAuthority::new(), directory)
            .check_session(&identity, &token("id-token"))
            .await;

        assert_eq!(liveness, expected);
    }
}
