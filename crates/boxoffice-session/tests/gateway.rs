//! End-to-end session behaviour against mocked backends.

use std::sync::Arc;

use boxoffice_client::{Endpoints, RegisterRequest, ServiceClientSet, ServiceKind};
use boxoffice_session::credential::encode_unsigned;
use boxoffice_session::{
    AuthError, AuthGateway, CREDENTIAL_KEY, FileStorage, GuardDecision, MemoryStorage, Route,
    SessionState, Storage, SubjectId, guard_route,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

struct Backends {
    identity: MockServer,
    catalog: MockServer,
    ticketing: MockServer,
}

impl Backends {
    async fn start() -> Self {
        Self {
            identity: MockServer::start().await,
            catalog: MockServer::start().await,
            ticketing: MockServer::start().await,
        }
    }

    fn clients(&self) -> ServiceClientSet {
        ServiceClientSet::builder()
            .endpoints(Endpoints::new(
                self.identity.uri(),
                self.catalog.uri(),
                self.ticketing.uri(),
            ))
            .build()
            .unwrap()
    }

    fn gateway(&self, storage: Arc<dyn Storage>) -> AuthGateway {
        AuthGateway::new(self.clients(), storage)
    }

    async fn mount_events(&self) {
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Jazz night", "price": 150.0}
            ])))
            .mount(&self.catalog)
            .await;
    }

    async fn mount_login(&self, token: &str, user: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": token, "user": user})),
            )
            .mount(&self.identity)
            .await;
    }
}

fn assert_all_bindings(gateway: &AuthGateway, expected: Option<&str>) {
    for kind in ServiceKind::ALL {
        assert_eq!(
            gateway.services().client(kind).authorization().as_deref(),
            expected,
            "{kind} binding"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Initialization
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_storage_is_anonymous_and_catalog_is_unauthenticated() {
    let backends = Backends::start().await;
    backends.mount_events().await;

    let gateway = backends.gateway(Arc::new(MemoryStorage::new()));
    assert!(gateway.session().loading);
    assert_eq!(
        guard_route(&gateway.state(), &Route::MyTickets),
        GuardDecision::Defer
    );

    assert_eq!(gateway.initialize().await, SessionState::Anonymous);
    assert!(!gateway.session().loading);
    assert_eq!(
        guard_route(&gateway.state(), &Route::MyTickets),
        GuardDecision::RedirectToLogin
    );

    let events = gateway.services().events().list().await.unwrap();
    assert_eq!(events.len(), 1);

    let requests = backends.catalog.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_malformed_persisted_credential_is_discarded_idempotently() {
    let backends = Backends::start().await;
    let storage = Arc::new(MemoryStorage::with_entry(CREDENTIAL_KEY, "not-a-token"));

    for _ in 0..2 {
        let gateway = backends.gateway(storage.clone());
        assert_eq!(gateway.initialize().await, SessionState::Anonymous);
        assert_eq!(gateway.initialize().await, SessionState::Anonymous);
        assert!(storage.snapshot().get(CREDENTIAL_KEY).is_none());
        assert_all_bindings(&gateway, None);
    }
}

#[tokio::test]
async fn test_valid_persisted_credential_restores_session() {
    let backends = Backends::start().await;
    let credential = encode_unsigned(&json!({"id": 4, "email": "a@b.com", "firstName": "Ada"}));
    let storage = Arc::new(MemoryStorage::with_entry(CREDENTIAL_KEY, credential.as_str()));

    let gateway = backends.gateway(storage);
    let state = gateway.initialize().await;

    let identity = state.identity().unwrap();
    assert_eq!(identity.id, Some(SubjectId::Number(4)));
    assert_eq!(identity.display_name(), "Ada");
    assert_all_bindings(&gateway, Some(&credential.bearer()));
    assert_eq!(
        guard_route(&gateway.state(), &Route::Profile),
        GuardDecision::Allow
    );
}

#[tokio::test]
async fn test_persisted_credential_with_unusual_claim_types_is_kept() {
    let backends = Backends::start().await;
    let credential = encode_unsigned(&json!({
        "sub": "7",
        "role": ["Admin", "Customer"],
        "exp": 4_000_000_000.5,
    }));
    let storage = Arc::new(MemoryStorage::with_entry(CREDENTIAL_KEY, credential.as_str()));

    let gateway = backends.gateway(storage.clone());
    let state = gateway.initialize().await;

    let identity = state.identity().unwrap();
    assert_eq!(identity.id, Some(SubjectId::Text("7".into())));
    assert_eq!(identity.exp, Some(4_000_000_000));
    assert_eq!(
        storage.snapshot().get(CREDENTIAL_KEY).map(String::as_str),
        Some(credential.as_str())
    );
    assert_all_bindings(&gateway, Some(&credential.bearer()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Login / register
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_arms_every_client() {
    let backends = Backends::start().await;
    backends.mount_login("tok1", json!({"id": 1, "email": "a@b.com"})).await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&backends.catalog)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let gateway = backends.gateway(storage.clone());
    gateway.initialize().await;

    gateway.login("a@b.com", "secret").await.unwrap();

    let identity = gateway.current_identity().unwrap();
    assert_eq!(identity.id, Some(SubjectId::Number(1)));
    assert_eq!(identity.email.as_deref(), Some("a@b.com"));
    assert_eq!(
        storage.snapshot().get(CREDENTIAL_KEY).map(String::as_str),
        Some("tok1")
    );
    assert_all_bindings(&gateway, Some("Bearer tok1"));

    gateway.services().events().list().await.unwrap();
}

#[tokio::test]
async fn test_login_sends_email_and_password() {
    let backends = Backends::start().await;
    let credential = encode_unsigned(&json!({"id": 8, "email": "a@b.com"}));
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": credential.as_str()})))
        .expect(1)
        .mount(&backends.identity)
        .await;

    let gateway = backends.gateway(Arc::new(MemoryStorage::new()));
    gateway.initialize().await;
    gateway.login("a@b.com", "secret").await.unwrap();

    // No user object in the response: identity comes from the decoded claims.
    let identity = gateway.current_identity().unwrap();
    assert_eq!(identity, credential.identity().unwrap());
}

#[tokio::test]
async fn test_rejected_login_leaves_anonymous_session_untouched() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!("Invalid credentials")))
        .mount(&backends.identity)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let gateway = backends.gateway(storage.clone());
    gateway.initialize().await;

    let err = gateway.login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(err.message(), "Invalid credentials");
    assert!(matches!(err, AuthError::Rejected { status: Some(401), .. }));

    assert_eq!(gateway.state(), SessionState::Anonymous);
    assert!(storage.snapshot().is_empty());
    assert_all_bindings(&gateway, None);
}

#[tokio::test]
async fn test_rejected_login_leaves_authenticated_session_untouched() {
    let backends = Backends::start().await;
    let credential = encode_unsigned(&json!({"id": 2, "email": "old@b.com"}));
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&backends.identity)
        .await;

    let storage = Arc::new(MemoryStorage::with_entry(CREDENTIAL_KEY, credential.as_str()));
    let gateway = backends.gateway(storage.clone());
    let before = gateway.initialize().await;

    let err = gateway.login("new@b.com", "pw").await.unwrap_err();
    assert_eq!(err.message(), "Login failed");

    assert_eq!(gateway.state(), before);
    assert_eq!(
        storage.snapshot().get(CREDENTIAL_KEY).map(String::as_str),
        Some(credential.as_str())
    );
    assert_all_bindings(&gateway, Some(&credential.bearer()));
}

#[tokio::test]
async fn test_login_against_unreachable_identity_service() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let clients = ServiceClientSet::builder()
        .endpoints(Endpoints::uniform(format!("http://127.0.0.1:{}", port)))
        .build()
        .unwrap();
    let gateway = AuthGateway::new(clients, Arc::new(MemoryStorage::new()));
    gateway.initialize().await;

    let err = gateway.login("a@b.com", "secret").await.unwrap_err();
    assert!(matches!(err, AuthError::Unreachable { .. }));
    assert_eq!(err.message(), "Login failed");
    assert_eq!(gateway.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_register_establishes_session() {
    let backends = Backends::start().await;
    let credential = encode_unsigned(&json!({"id": 12, "email": "new@b.com", "exp": 4_000_000_000_i64}));
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "new@b.com",
            "password": "cobol60",
            "phoneNumber": "0701234567"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": credential.as_str(),
            "user": {"id": 12, "email": "new@b.com", "firstName": "Grace", "lastName": "Hopper"}
        })))
        .expect(1)
        .mount(&backends.identity)
        .await;

    let gateway = backends.gateway(Arc::new(MemoryStorage::new()));
    gateway.initialize().await;

    let request = RegisterRequest {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        email: "new@b.com".into(),
        password: "cobol60".into(),
        phone_number: Some("0701234567".into()),
    };
    gateway.register(&request).await.unwrap();

    let identity = gateway.current_identity().unwrap();
    assert_eq!(identity.display_name(), "Grace Hopper");
    assert_eq!(identity.exp, Some(4_000_000_000));
    assert_all_bindings(&gateway, Some(&credential.bearer()));
}

#[tokio::test]
async fn test_register_conflict_uses_backend_message() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Email already registered"})),
        )
        .mount(&backends.identity)
        .await;

    let gateway = backends.gateway(Arc::new(MemoryStorage::new()));
    gateway.initialize().await;

    let err = gateway
        .register(&RegisterRequest {
            email: "taken@b.com".into(),
            password: "pw123456".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Email already registered");
    assert!(!gateway.state().is_authenticated());
}

#[tokio::test]
async fn test_login_with_numeric_role_in_user_object() {
    let backends = Backends::start().await;
    backends
        .mount_login("tok1", json!({"id": 1, "email": "a@b.com", "role": 0}))
        .await;

    let gateway = backends.gateway(Arc::new(MemoryStorage::new()));
    gateway.initialize().await;
    gateway.login("a@b.com", "secret").await.unwrap();

    let identity = gateway.current_identity().unwrap();
    assert_eq!(identity.email.as_deref(), Some("a@b.com"));
    assert_eq!(identity.claims["role"], json!(0));
    assert_all_bindings(&gateway, Some("Bearer tok1"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Logout
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_from_any_state() {
    let backends = Backends::start().await;
    backends.mount_login("tok1", json!({"id": 1})).await;

    // Before initialization.
    let storage = Arc::new(MemoryStorage::with_entry(CREDENTIAL_KEY, "tok0"));
    let gateway = backends.gateway(storage.clone());
    gateway.logout().await;
    assert_eq!(gateway.state(), SessionState::Anonymous);
    assert!(storage.snapshot().is_empty());
    assert_all_bindings(&gateway, None);

    // After logging in.
    gateway.login("a@b.com", "secret").await.unwrap();
    assert!(gateway.state().is_authenticated());
    gateway.logout().await;
    assert_eq!(gateway.state(), SessionState::Anonymous);
    assert!(storage.snapshot().is_empty());
    assert_all_bindings(&gateway, None);

    // Twice in a row.
    gateway.logout().await;
    assert_eq!(gateway.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_logout_does_not_call_backends() {
    let backends = Backends::start().await;
    let gateway = backends.gateway(Arc::new(MemoryStorage::new()));
    gateway.initialize().await;
    gateway.logout().await;

    assert!(backends.identity.received_requests().await.unwrap().is_empty());
    assert!(backends.catalog.received_requests().await.unwrap().is_empty());
    assert!(backends.ticketing.received_requests().await.unwrap().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence across restarts
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_survives_restart_with_file_storage() {
    let backends = Backends::start().await;
    let credential = encode_unsigned(&json!({"id": 1, "email": "a@b.com"}));
    backends
        .mount_login(credential.as_str(), json!({"id": 1, "email": "a@b.com"}))
        .await;

    let dir = tempfile::tempdir().unwrap();

    let first = backends.gateway(Arc::new(FileStorage::new(dir.path())));
    first.initialize().await;
    first.login("a@b.com", "secret").await.unwrap();
    drop(first);

    let second = backends.gateway(Arc::new(FileStorage::new(dir.path())));
    let state = second.initialize().await;
    assert_eq!(state.identity().unwrap().email.as_deref(), Some("a@b.com"));
    assert_all_bindings(&second, Some(&credential.bearer()));

    second.logout().await;
    let third = backends.gateway(Arc::new(FileStorage::new(dir.path())));
    assert_eq!(third.initialize().await, SessionState::Anonymous);
}

#[tokio::test]
async fn test_corrupt_storage_file_does_not_block_login() {
    let backends = Backends::start().await;
    backends.mount_login("tok1", json!({"id": 1})).await;

    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    std::fs::write(storage.path(), r#"{"token": 5}"#).unwrap();

    let gateway = backends.gateway(storage.clone());
    assert_eq!(gateway.initialize().await, SessionState::Anonymous);

    gateway.login("a@b.com", "secret").await.unwrap();
    assert!(gateway.state().is_authenticated());
    assert_eq!(
        storage.get(CREDENTIAL_KEY).await.unwrap().as_deref(),
        Some("tok1")
    );

    gateway.logout().await;
    assert_eq!(storage.get(CREDENTIAL_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_subscriber_observes_login() {
    let backends = Backends::start().await;
    backends.mount_login("tok1", json!({"id": 1})).await;

    let gateway = backends.gateway(Arc::new(MemoryStorage::new()));
    let mut rx = gateway.subscribe();
    gateway.initialize().await;
    assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);

    gateway.login("a@b.com", "secret").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_authenticated());
}
