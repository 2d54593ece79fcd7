//! Federated registration over the Identity Toolkit and Firestore adapters.

use std::sync::Arc;

use agrotrace::domain::ports::{AuthError, IdentityProvider};
use agrotrace::domain::{FederatedIdentityProvider, Registration, Role};
use agrotrace::outbound::firebase::{FirestoreProfileDirectory, IdentityToolkitAuthority};
use mockable::DefaultClock;
use reqwest::Client;
use rstest::{fixture, rstest};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROFILE_PATH: &str = "/v1/projects/agro/databases/(default)/documents/users/uid-new";

type Provider = FederatedIdentityProvider<IdentityToolkitAuthority, FirestoreProfileDirectory>;

fn provider(server: &MockServer) -> Provider {
    let client = Client::new();
    let toolkit = Url::parse(&format!("{}/v1/", server.uri())).expect("toolkit url");
    let documents = Url::parse(&format!(
        "{}/v1/projects/agro/databases/(default)/documents",
        server.uri()
    ))
    .expect("documents url");
    FederatedIdentityProvider::new(
        Arc::new(IdentityToolkitAuthority::new(client.clone(), toolkit, "test-key")),
        Arc::new(FirestoreProfileDirectory::new(
            client,
            documents,
            Arc::new(DefaultClock),
        )),
    )
}

fn registration() -> Registration {
    Registration::try_from_parts("Ana", "ana@x.com", "123456", Role::Buyer).expect("registration")
}

#[fixture]
async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": "id-new",
            "email": "ana@x.com",
            "localId": "uid-new"
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[rstest]
#[tokio::test]
async fn failed_profile_write_deletes_the_new_account(#[future] server: MockServer) {
    let server = server.await;
    Mock::given(method("PATCH"))
        .and(path(PROFILE_PATH))
        .and(header("authorization", "Bearer id-new"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({
                "error": { "code": 503, "message": "unavailable", "status": "UNAVAILABLE" }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:delete"))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({ "idToken": "id-new" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .register(&registration())
        .await
        .expect_err("profile write fails");

    assert_eq!(err.code(), "remote");
    assert!(matches!(err, AuthError::Remote { .. }));
    server.verify().await;
}

#[rstest]
#[tokio::test]
async fn successful_registration_keeps_the_account(#[future] server: MockServer) {
    let server = server.await;
    Mock::given(method("PATCH"))
        .and(path(PROFILE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let session = provider(&server)
        .register(&registration())
        .await
        .expect("registered");

    assert_eq!(session.identity.id().as_ref(), "uid-new");
    assert_eq!(session.identity.name().as_ref(), "Ana");
    assert_eq!(session.identity.role(), Role::Buyer);
    assert_eq!(session.token.expose(), "id-new");
    server.verify().await;
}
