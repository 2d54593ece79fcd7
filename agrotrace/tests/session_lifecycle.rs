//! End-to-end client flows against a stubbed marketplace backend.

use std::sync::Arc;
use std::time::Duration;

use agrotrace::domain::ports::AuthError;
use agrotrace::domain::{
    AuthStatus, Locale, LotDraft, OfferDecision, OfferDraft, OfferStatus, Role, ServiceError,
};
use agrotrace::inbound::navigation::{Route, RouteDecision, gate};
use agrotrace::{AgroTrace, ClientConfig, IdentityBackend};
use camino::Utf8PathBuf;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    storage: TempDir,
}

impl Harness {
    fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: Url::parse(&format!("{}/api", self.server.uri())).expect("api url"),
            storage_dir: Some(
                Utf8PathBuf::from_path_buf(self.storage.path().to_path_buf())
                    .expect("utf-8 storage path"),
            ),
            request_timeout: Duration::from_secs(5),
            locale: Locale::Es,
            identity: IdentityBackend::Backend,
            qr_service_url: Url::parse("https://api.qrserver.com/v1/create-qr-code/")
                .expect("qr url"),
        }
    }

    fn app(&self) -> AgroTrace {
        AgroTrace::build(&self.config(), Arc::new(DefaultClock)).expect("app builds")
    }

    fn stored_files(&self) -> usize {
        std::fs::read_dir(self.storage.path())
            .expect("list storage")
            .count()
    }
}

#[fixture]
async fn harness() -> Harness {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "uid": "uid-ana",
            "email": "ana@x.com",
            "token": "tok-ana",
            "message": "Usuario registrado exitosamente"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({ "email": "luis@x.com", "password": "cosecha1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": "uid-luis",
            "email": "luis@x.com",
            "token": "tok-luis",
            "user_data": { "name": "Luis", "role": "farmer" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Credenciales inválidas" })),
        )
        .mount(&server)
        .await;
    Harness {
        server,
        storage: tempfile::tempdir().expect("storage dir"),
    }
}

#[rstest]
#[tokio::test]
async fn registration_persists_across_restarts(#[future] harness: Harness) {
    let harness = harness.await;
    let app = harness.app();
    let auth = app.auth();
    auth.initialize().await;

    let identity = auth
        .register("Ana", "ana@x.com", "123456", Role::Buyer)
        .await
        .expect("registration");
    assert_eq!(identity.name().as_ref(), "Ana");
    assert_eq!(identity.role(), Role::Buyer);
    assert_eq!(harness.stored_files(), 2);

    let restarted = harness.app();
    let snapshot = restarted.auth().initialize().await;
    assert_eq!(snapshot.status, AuthStatus::Authenticated(identity));
    assert_eq!(gate(Route::Offers, &snapshot), RouteDecision::Render);
    assert_eq!(
        gate(Route::NewLot, &snapshot),
        RouteDecision::Redirect(Route::Dashboard)
    );
}

#[rstest]
#[tokio::test]
async fn rejected_login_stays_anonymous_with_message(#[future] harness: Harness) {
    let harness = harness.await;
    let app = harness.app();
    let auth = app.auth();
    auth.initialize().await;

    let err = auth
        .login("a@b.com", "wrongpw", Role::Farmer)
        .await
        .expect_err("rejected");

    assert_eq!(err, AuthError::InvalidCredentials);
    assert!(!auth.describe(&err).is_empty());
    assert_eq!(auth.snapshot().status, AuthStatus::Anonymous);
    assert_eq!(harness.stored_files(), 0);
}

#[rstest]
#[tokio::test]
async fn logout_clears_persisted_session(#[future] harness: Harness) {
    let harness = harness.await;
    let app = harness.app();
    let auth = app.auth();
    auth.initialize().await;
    auth.login("luis@x.com", "cosecha1", Role::Buyer)
        .await
        .expect("login");

    auth.logout().await.expect("logout");

    assert_eq!(auth.snapshot().status, AuthStatus::Anonymous);
    assert_eq!(harness.stored_files(), 0);
    assert_eq!(
        gate(Route::Dashboard, &auth.snapshot()),
        RouteDecision::Redirect(Route::Login)
    );
}

#[rstest]
#[tokio::test]
async fn farmer_publishes_lot_and_decides_offer(#[future] harness: Harness) {
    let harness = harness.await;
    Mock::given(method("POST"))
        .and(path("/api/lots"))
        .and(header("authorization", "Bearer tok-luis"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "lot": {
                "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "farmer_uid": "uid-luis",
                "crop_type": "Café",
                "quantity": 250,
                "unit": "kg",
                "price": 12000,
                "currency": "COP",
                "status": "active",
                "created_at": "Fri, 14 Mar 2025 09:26:53 GMT"
            }
        })))
        .expect(1)
        .mount(&harness.server)
        .await;
    let app = harness.app();
    let auth = app.auth();
    auth.initialize().await;

    let farmer = auth
        .login("luis@x.com", "cosecha1", Role::Buyer)
        .await
        .expect("login");
    assert_eq!(farmer.role(), Role::Farmer);

    let draft = LotDraft::new("Café", 250.0)
        .expect("draft")
        .with_price(12_000.0, "COP")
        .expect("price");
    let lot = app.lots().create(&draft).await.expect("lot created");
    assert_eq!(lot.traceability_code.as_str(), "LOT-20250314092653-3FA85F64");
    assert_eq!(lot.farmer_name.as_deref(), Some("Luis"));

    let offer_attempt = app
        .offers()
        .create(&OfferDraft::new(lot.id.clone(), 11_000.0, 10.0).expect("offer draft"))
        .await;
    assert!(matches!(offer_attempt, Err(ServiceError::Forbidden { .. })));

    auth.logout().await.expect("logout");
    auth.register("Ana", "ana@x.com", "123456", Role::Buyer)
        .await
        .expect("buyer registration");
    let offer = app
        .offers()
        .create(&OfferDraft::new(lot.id.clone(), 11_000.0, 10.0).expect("offer draft"))
        .await
        .expect("offer");
    assert_eq!(offer.status, OfferStatus::Pending);

    auth.logout().await.expect("logout");
    auth.login("luis@x.com", "cosecha1", Role::Farmer)
        .await
        .expect("farmer login");
    let decided = app
        .offers()
        .decide(&offer.id, OfferDecision::Accept)
        .await
        .expect("accepted");
    assert_eq!(decided.status, OfferStatus::Accepted);
}
