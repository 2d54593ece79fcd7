//! Firestore REST adapter for [`ProfileDirectory`].
//!
//! Profiles live at `users/{uid}` with `name`, `email`, `role` and
//! `createdAt` fields. Requests carry the account's ID token so Firestore
//! security rules can restrict each user to their own document.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tracing::debug;

use super::dto::DocumentDto;
use crate::domain::ports::{AuthError, ProfileDirectory, UserProfile};
use crate::domain::{DisplayName, Email, Role, SessionToken, UserId};
use crate::outbound::backend::body_preview;

const COLLECTION: &str = "users";

/// Profile directory stored in a Firestore collection.
#[derive(Clone)]
pub struct FirestoreProfileDirectory {
    client: Client,
    documents: Url,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl FirestoreProfileDirectory {
    /// `documents` is the database's documents root, for example
    /// `https://firestore.googleapis.com/v1/projects/<id>/databases/(default)/documents`.
    pub fn new(client: Client, documents: Url, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            client,
            documents,
            clock,
        }
    }

    /// Documents root of the default database in `project_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the project id does not form a valid URL.
    pub fn documents_url(project_id: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse("https://firestore.googleapis.com/v1/")?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["projects", project_id, "databases", "(default)", "documents"]);
        }
        Ok(url)
    }

    fn document_url(&self, uid: &UserId) -> Result<Url, AuthError> {
        let mut url = self.documents.clone();
        url.path_segments_mut()
            .map_err(|()| AuthError::remote("profile directory URL cannot carry a path"))?
            .pop_if_empty()
            .extend([COLLECTION, uid.as_ref()]);
        Ok(url)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        token: &SessionToken,
    ) -> Result<(StatusCode, Vec<u8>), AuthError> {
        let response = request
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|err| AuthError::network(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| AuthError::network(err.to_string()))?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl ProfileDirectory for FirestoreProfileDirectory {
    async fn create_profile(
        &self,
        profile: &UserProfile,
        token: &SessionToken,
    ) -> Result<(), AuthError> {
        let mut document = DocumentDto::default()
            .with_string("name", profile.name.as_ref())
            .with_string("email", profile.email.as_ref())
            .with_timestamp("createdAt", self.clock.utc().to_rfc3339());
        if let Some(role) = profile.role {
            document = document.with_string("role", role.as_str());
        }
        let url = self.document_url(&profile.uid)?;
        let (status, body) = self.send(self.client.patch(url).json(&document), token).await?;
        if !status.is_success() {
            return Err(map_failure(status, &body));
        }
        debug!(uid = %profile.uid, "profile written");
        Ok(())
    }

    async fn fetch_profile(
        &self,
        uid: &UserId,
        token: &SessionToken,
    ) -> Result<Option<UserProfile>, AuthError> {
        let url = self.document_url(uid)?;
        let (status, body) = self.send(self.client.get(url), token).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_failure(status, &body));
        }
        let document: DocumentDto = serde_json::from_slice(&body)
            .map_err(|err| AuthError::remote(format!("invalid profile document: {err}")))?;
        decode_profile(uid, &document).map(Some)
    }
}

fn decode_profile(uid: &UserId, document: &DocumentDto) -> Result<UserProfile, AuthError> {
    let email = document
        .string("email")
        .ok_or_else(|| AuthError::remote(format!("profile {uid} has no email")))
        .and_then(|raw| Email::new(raw).map_err(|err| AuthError::remote(err.to_string())))?;
    let name = document
        .string("name")
        .and_then(|raw| DisplayName::new(raw).ok())
        .unwrap_or_else(|| DisplayName::from_email(&email));
    let role = document.string("role").and_then(|raw| match raw.parse::<Role>() {
        Ok(role) => Some(role),
        Err(err) => {
            debug!(%uid, error = %err, "ignoring unrecognised profile role");
            None
        }
    });
    Ok(UserProfile {
        uid: uid.clone(),
        email,
        name,
        role,
    })
}

fn map_failure(status: StatusCode, body: &[u8]) -> AuthError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthError::unauthenticated(),
        StatusCode::TOO_MANY_REQUESTS => AuthError::rate_limited(),
        _ => AuthError::remote(format!("status {}: {}", status.as_u16(), body_preview(body))),
    }
}

#[cfg(test)]
mod tests {
    //! Wire-level coverage against a stub Firestore.

    use super::*;
    use crate::domain::test_support::{FixedClock, fixed_instant, token};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOC_PATH: &str = "/v1/projects/agro/databases/(default)/documents/users/uid-ana";

    fn directory(server: &MockServer) -> FirestoreProfileDirectory {
        let documents = Url::parse(&format!(
            "{}/v1/projects/agro/databases/(default)/documents",
            server.uri()
        ))
        .expect("documents url");
        FirestoreProfileDirectory::new(
            Client::new(),
            documents,
            Arc::new(FixedClock(fixed_instant())),
        )
    }

    fn uid() -> UserId {
        UserId::new("uid-ana").expect("uid")
    }

    #[test]
    fn builds_project_documents_url() {
        let url = FirestoreProfileDirectory::documents_url("agro-589bb").expect("url");
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/agro-589bb/databases/(default)/documents"
        );
    }

    #[tokio::test]
    async fn writes_profile_fields_with_clock_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(DOC_PATH))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_json(json!({
                "fields": {
                    "createdAt": { "timestampValue": fixed_instant().to_rfc3339() },
                    "email": { "stringValue": "ana@x.com" },
                    "name": { "stringValue": "Ana" },
                    "role": { "stringValue": "buyer" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        let profile = UserProfile {
            uid: uid(),
            email: Email::new("ana@x.com").expect("email"),
            name: DisplayName::new("Ana").expect("name"),
            role: Some(Role::Buyer),
        };

        directory(&server)
            .create_profile(&profile, &token("tok-1"))
            .await
            .expect("written");
    }

    #[tokio::test]
    async fn reads_profile_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/agro/databases/(default)/documents/users/uid-ana",
                "fields": {
                    "name": { "stringValue": "Ana" },
                    "email": { "stringValue": "ana@x.com" },
                    "role": { "stringValue": "farmer" },
                    "createdAt": { "timestampValue": "2025-03-14T09:26:53Z" }
                }
            })))
            .mount(&server)
            .await;

        let profile = directory(&server)
            .fetch_profile(&uid(), &token("tok-1"))
            .await
            .expect("fetched")
            .expect("present");

        assert_eq!(profile.name.as_ref(), "Ana");
        assert_eq!(profile.role, Some(Role::Farmer));
    }

    #[tokio::test]
    async fn legacy_profile_without_role_or_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fields": { "email": { "stringValue": "ana@x.com" } }
            })))
            .mount(&server)
            .await;

        let profile = directory(&server)
            .fetch_profile(&uid(), &token("tok-1"))
            .await
            .expect("fetched")
            .expect("present");

        assert_eq!(profile.name.as_ref(), "ana");
        assert_eq!(profile.role, None);
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "status": "NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let profile = directory(&server)
            .fetch_profile(&uid(), &token("tok-1"))
            .await
            .expect("lookup");

        assert_eq!(profile, None);
    }

    #[tokio::test]
    async fn rejected_token_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = directory(&server)
            .fetch_profile(&uid(), &token("expired"))
            .await
            .expect_err("rejected");

        assert_eq!(err, AuthError::Unauthenticated);
    }
}
