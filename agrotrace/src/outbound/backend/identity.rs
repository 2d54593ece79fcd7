//! Identity provider backed by the marketplace backend's `/auth` routes.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::client::{
    BackendClient, BackendResponse, TransportFailure, error_code, error_message,
};
use super::dto::{LoginRequestDto, LoginResponseDto, RegisterRequestDto, RegisterResponseDto};
use crate::domain::ports::{AuthError, AuthenticatedSession, IdentityProvider, resolve_role};
use crate::domain::{
    DisplayName, Email, Identity, LoginCredentials, Registration, Role, SessionToken, UserId,
};

/// [`IdentityProvider`] for `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: BackendClient,
}

impl HttpIdentityProvider {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    async fn post<B: serde::Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<BackendResponse, AuthError> {
        let url = self.client.endpoint(segments).map_err(AuthError::remote)?;
        self.client
            .execute(self.client.post(url).json(body), None)
            .await
            .map_err(map_transport_error)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
        requested_role: Role,
    ) -> Result<AuthenticatedSession, AuthError> {
        let body = LoginRequestDto {
            email: credentials.email().as_ref(),
            password: credentials.password(),
        };
        let response = self.post(&["auth", "login"], &body).await?;
        if !response.status.is_success() {
            return Err(map_login_status(response.status, &response.body));
        }
        let decoded: LoginResponseDto = decode(&response.body)?;

        let user_data = decoded.user_data.unwrap_or_default();
        let email = match decoded.email.as_deref().map(Email::new) {
            Some(Ok(email)) => email,
            _ => credentials.email().clone(),
        };
        let name = user_data
            .name
            .and_then(|name| DisplayName::new(name).ok())
            .unwrap_or_else(|| DisplayName::from_email(&email));
        let authority_role = user_data.role.and_then(|raw| match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                debug!(error = %err, "ignoring unrecognised backend role");
                None
            }
        });
        let role = resolve_role(authority_role, requested_role);
        let uid = UserId::new(decoded.uid).map_err(|err| AuthError::remote(err.to_string()))?;
        let token = SessionToken::new(decoded.token)
            .map_err(|err| AuthError::remote(err.to_string()))?;

        Ok(AuthenticatedSession {
            identity: Identity::new(uid, email, name, role),
            token,
        })
    }

    async fn register(&self, registration: &Registration) -> Result<AuthenticatedSession, AuthError> {
        let body = RegisterRequestDto {
            name: registration.name().as_ref(),
            email: registration.email().as_ref(),
            password: registration.password(),
            role: registration.role().as_str(),
        };
        let response = self.post(&["auth", "register"], &body).await?;
        if !response.status.is_success() {
            return Err(map_register_status(response.status, &response.body));
        }
        let decoded: RegisterResponseDto = decode(&response.body)?;

        let uid = UserId::new(decoded.uid).map_err(|err| AuthError::remote(err.to_string()))?;
        let token = SessionToken::new(decoded.token)
            .map_err(|err| AuthError::remote(err.to_string()))?;
        Ok(AuthenticatedSession {
            identity: Identity::new(
                uid,
                registration.email().clone(),
                registration.name().clone(),
                registration.role(),
            ),
            token,
        })
    }

    async fn sign_out(&self, token: &SessionToken) {
        // The backend issues stateless tokens and exposes no logout route.
        debug!(token = %token.fingerprint(), "backend sign-out is local only");
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, AuthError> {
    serde_json::from_slice(body)
        .map_err(|err| AuthError::remote(format!("invalid auth response: {err}")))
}

fn map_transport_error(failure: TransportFailure) -> AuthError {
    AuthError::network(failure.describe())
}

fn map_login_status(status: StatusCode, body: &[u8]) -> AuthError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => AuthError::invalid_credentials(),
        _ => map_common_status(status, body),
    }
}

fn map_register_status(status: StatusCode, body: &[u8]) -> AuthError {
    match status {
        StatusCode::CONFLICT => AuthError::email_in_use(),
        StatusCode::BAD_REQUEST => map_rejected_registration(status, body),
        _ => map_common_status(status, body),
    }
}

/// Classify a 400 from `auth/register`.
///
/// A structured `code` wins. Otherwise the message is matched by topic and
/// only a message naming exactly one field is classified.
fn map_rejected_registration(status: StatusCode, body: &[u8]) -> AuthError {
    let message = error_message(status, body);
    match error_code(body).as_deref() {
        Some("invalid_email") => return AuthError::invalid_email(),
        Some("weak_password") => return AuthError::weak_password(message),
        Some("email_in_use") => return AuthError::email_in_use(),
        _ => {}
    }

    let lowered = message.to_lowercase();
    let names_email = ["email", "correo"].iter().any(|word| lowered.contains(word));
    let names_password = ["password", "contraseña"]
        .iter()
        .any(|word| lowered.contains(word));
    match (names_email, names_password) {
        (true, false) => AuthError::invalid_email(),
        (false, true) => AuthError::weak_password(message),
        _ => AuthError::remote(message),
    }
}

fn map_common_status(status: StatusCode, body: &[u8]) -> AuthError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => AuthError::rate_limited(),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            AuthError::network(error_message(status, body))
        }
        _ => AuthError::remote(error_message(status, body)),
    }
}
