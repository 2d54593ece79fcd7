//! Identity Toolkit REST adapter for [`IdentityAuthority`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{AccountResponseDto, DeleteRequestDto, ErrorResponseDto, PasswordRequestDto};
use crate::domain::ports::{AuthError, AuthorityAccount, IdentityAuthority};
use crate::domain::{Email, LoginCredentials, Registration, SessionToken, UserId};
use crate::outbound::backend::body_preview;

/// Public Identity Toolkit endpoint.
pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1/";

/// Email/password accounts on a Firebase project.
#[derive(Clone)]
pub struct IdentityToolkitAuthority {
    client: Client,
    base: Url,
    api_key: Zeroizing<String>,
}

impl std::fmt::Debug for IdentityToolkitAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityToolkitAuthority")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl IdentityToolkitAuthority {
    /// `base` is normally [`IDENTITY_TOOLKIT_URL`].
    pub fn new(client: Client, base: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base,
            api_key: Zeroizing::new(api_key.into()),
        }
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AuthError::remote(format!("authority URL '{}' cannot carry a path", self.base))
            })?
            .pop_if_empty()
            .push(method);
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| AuthError::network(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| AuthError::network(err.to_string()))?;
        if !status.is_success() {
            return Err(map_failure(status, &bytes));
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| AuthError::remote(format!("invalid authority response: {err}")))
    }

    async fn password_call(
        &self,
        method: &str,
        email: &Email,
        password: &str,
    ) -> Result<AuthorityAccount, AuthError> {
        let request = PasswordRequestDto {
            email: email.as_ref(),
            password,
            return_secure_token: true,
        };
        let account: AccountResponseDto = self.call(method, &request).await?;
        into_account(account, email)
    }
}

#[async_trait]
impl IdentityAuthority for IdentityToolkitAuthority {
    async fn create_account(
        &self,
        registration: &Registration,
    ) -> Result<AuthorityAccount, AuthError> {
        let account = self
            .password_call("accounts:signUp", registration.email(), registration.password())
            .await?;
        debug!(uid = %account.uid, "authority account created");
        Ok(account)
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AuthorityAccount, AuthError> {
        self.password_call(
            "accounts:signInWithPassword",
            credentials.email(),
            credentials.password(),
        )
        .await
    }

    async fn delete_account(&self, account: &AuthorityAccount) -> Result<(), AuthError> {
        let request = DeleteRequestDto {
            id_token: account.token.expose(),
        };
        let _: serde_json::Value = self.call("accounts:delete", &request).await?;
        debug!(uid = %account.uid, "authority account deleted");
        Ok(())
    }
}

fn into_account(dto: AccountResponseDto, requested: &Email) -> Result<AuthorityAccount, AuthError> {
    let uid = UserId::new(dto.local_id).map_err(|err| AuthError::remote(err.to_string()))?;
    let email = match dto.email.as_deref().map(Email::new) {
        Some(Ok(email)) => email,
        _ => requested.clone(),
    };
    let token = SessionToken::new(dto.id_token).map_err(|err| AuthError::remote(err.to_string()))?;
    Ok(AuthorityAccount { uid, email, token })
}

fn map_failure(status: StatusCode, body: &[u8]) -> AuthError {
    let Ok(envelope) = serde_json::from_slice::<ErrorResponseDto>(body) else {
        return AuthError::remote(format!("status {}: {}", status.as_u16(), body_preview(body)));
    };
    let error = envelope.error;
    match error.code() {
        "EMAIL_EXISTS" => AuthError::email_in_use(),
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::invalid_email(),
        "EMAIL_NOT_FOUND"
        | "INVALID_PASSWORD"
        | "INVALID_LOGIN_CREDENTIALS"
        | "USER_DISABLED"
        | "MISSING_PASSWORD" => AuthError::invalid_credentials(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::rate_limited(),
        "INVALID_ID_TOKEN" | "USER_NOT_FOUND" | "TOKEN_EXPIRED" => AuthError::unauthenticated(),
        code if code.starts_with("WEAK_PASSWORD") => AuthError::weak_password(error.message),
        _ => AuthError::remote(format!("status {}: {}", status.as_u16(), error.message)),
    }
}
