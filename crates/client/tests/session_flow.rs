//! End-to-end session lifecycle against a real in-process API.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use pluribus_api::ApiConfig;
use pluribus_auth::{Credentials, Role, Surface, TokenPair};
use pluribus_client::{FileTokenStore, HttpAuthGateway, TokenStore};
use pluribus_session::{SessionError, SessionManager};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app = pluribus_api::build_app(ApiConfig::for_tests("client-test-secret")).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn token_file() -> PathBuf {
    std::env::temp_dir().join(format!("pluribus-session-{}.json", uuid::Uuid::now_v7()))
}

fn manager_over(
    base_url: &str,
    store: Arc<FileTokenStore>,
    surface: Surface,
) -> SessionManager {
    let gateway = Arc::new(HttpAuthGateway::new(base_url, store));
    SessionManager::new(surface, gateway)
}

async fn register(srv: &TestServer, email: &str, password: &str, role: &str) {
    let res = reqwest::Client::new()
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "email": email,
            "password": password,
            "display_name": "Flow Tester",
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn fresh_client_initializes_anonymous_then_logs_in() {
    let srv = TestServer::spawn().await;
    register(&srv, "fresh@flow.test", "correct-horse", "BUYER").await;

    let store = Arc::new(FileTokenStore::new(token_file()));
    let manager = manager_over(&srv.base_url, Arc::clone(&store), Surface::Storefront);

    let snapshot = manager.initialize().await;
    assert!(!snapshot.is_authenticated());
    assert!(!snapshot.loading());

    // Wrong password: rejected, still anonymous, nothing persisted.
    let err = manager
        .login(&credentials("fresh@flow.test", "wrong-horse"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidCredentials(_)));
    assert!(!manager.is_authenticated());
    assert!(store.load().unwrap().is_none());

    let user = manager
        .login(&credentials("fresh@flow.test", "correct-horse"))
        .await
        .unwrap();
    assert_eq!(user.role, Role::Buyer);
    assert!(manager.is_authenticated());
    assert!(store.load().unwrap().is_some());

    store.clear().unwrap();
}

#[tokio::test]
async fn persisted_session_survives_process_restart() {
    let srv = TestServer::spawn().await;
    register(&srv, "restart@flow.test", "correct-horse", "SELLER").await;

    let path = token_file();
    {
        let store = Arc::new(FileTokenStore::new(&path));
        let manager = manager_over(&srv.base_url, store, Surface::Storefront);
        manager.initialize().await;
        manager
            .login(&credentials("restart@flow.test", "correct-horse"))
            .await
            .unwrap();
    }

    // New manager over the same token file stands in for a restarted process.
    let store = Arc::new(FileTokenStore::new(&path));
    let manager = manager_over(&srv.base_url, Arc::clone(&store), Surface::Storefront);

    let snapshot = manager.initialize().await;
    assert!(snapshot.is_authenticated());
    assert_eq!(
        snapshot.current_user().unwrap().email.as_str(),
        "restart@flow.test"
    );

    store.clear().unwrap();
}

#[tokio::test]
async fn dead_access_token_is_refreshed_transparently() {
    let srv = TestServer::spawn().await;
    register(&srv, "refresh@flow.test", "correct-horse", "BUYER").await;

    let path = token_file();
    let store = Arc::new(FileTokenStore::new(&path));
    {
        let manager = manager_over(&srv.base_url, Arc::clone(&store), Surface::Storefront);
        manager.initialize().await;
        manager
            .login(&credentials("refresh@flow.test", "correct-horse"))
            .await
            .unwrap();
    }

    // Invalidate just the access token; the refresh token stays good.
    let pair = store.load().unwrap().unwrap();
    store
        .save(&TokenPair {
            access: "no-longer-a-jwt".to_string(),
            refresh: pair.refresh.clone(),
        })
        .unwrap();

    let manager = manager_over(&srv.base_url, Arc::clone(&store), Surface::Storefront);
    let snapshot = manager.initialize().await;
    assert!(snapshot.is_authenticated(), "refresh flow should recover");

    let rotated = store.load().unwrap().unwrap();
    assert_ne!(rotated.access, "no-longer-a-jwt");
    assert_ne!(rotated.refresh, pair.refresh, "refresh token must rotate");

    store.clear().unwrap();
}

#[tokio::test]
async fn rejected_refresh_clears_the_persisted_pair() {
    let srv = TestServer::spawn().await;
    register(&srv, "revoked@flow.test", "correct-horse", "BUYER").await;

    let path = token_file();
    let store = Arc::new(FileTokenStore::new(&path));
    {
        let manager = manager_over(&srv.base_url, Arc::clone(&store), Surface::Storefront);
        manager.initialize().await;
        manager
            .login(&credentials("revoked@flow.test", "correct-horse"))
            .await
            .unwrap();
    }

    // Both tokens dead: the server rejects the session outright.
    store
        .save(&TokenPair {
            access: "dead-access".to_string(),
            refresh: "dead-refresh".to_string(),
        })
        .unwrap();

    let manager = manager_over(&srv.base_url, Arc::clone(&store), Surface::Storefront);
    let snapshot = manager.initialize().await;
    assert!(!snapshot.is_authenticated());
    assert!(!snapshot.loading());
    assert!(store.load().unwrap().is_none(), "dead pair must be discarded");
}

#[tokio::test]
async fn marketplace_role_cannot_enter_the_admin_surface() {
    let srv = TestServer::spawn().await;
    register(&srv, "buyer@flow.test", "correct-horse", "BUYER").await;

    let store = Arc::new(FileTokenStore::new(token_file()));
    let manager = manager_over(&srv.base_url, Arc::clone(&store), Surface::Admin);
    manager.initialize().await;

    let err = manager
        .login(&credentials("buyer@flow.test", "correct-horse"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::AccessDenied {
            surface: Surface::Admin,
            role: Role::Buyer,
        }
    );
    assert!(!manager.is_authenticated());
    assert!(
        store.load().unwrap().is_none(),
        "rejected login must not leave a usable pair behind"
    );
}

#[tokio::test]
async fn logout_revokes_the_refresh_token_server_side() {
    let srv = TestServer::spawn().await;
    register(&srv, "logout@flow.test", "correct-horse", "BOTH").await;

    let store = Arc::new(FileTokenStore::new(token_file()));
    let manager = manager_over(&srv.base_url, Arc::clone(&store), Surface::Storefront);
    manager.initialize().await;
    manager
        .login(&credentials("logout@flow.test", "correct-horse"))
        .await
        .unwrap();

    let pair = store.load().unwrap().unwrap();

    let snapshot = manager.logout().await;
    assert!(!snapshot.is_authenticated());
    assert!(store.load().unwrap().is_none());

    // The old refresh token is burned on the server too.
    let res = reqwest::Client::new()
        .post(format!("{}/auth/refresh", srv.base_url))
        .json(&json!({ "refresh_token": pair.refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Logging out again is a quiet no-op.
    let again = manager.logout().await;
    assert!(!again.is_authenticated());
}
