//! Integration tests for Bramble.
//!
//! Each test spawns the real application router on an ephemeral port with
//! in-memory store backends and a `MemoryStore`-backed session layer, then
//! drives it over HTTP with a cookie-holding reqwest client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bramble-integration-tests
//! ```
//!
//! Tests against the `PostgreSQL` repositories live in the server crate and
//! are `#[ignore]`d unless a database is available.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use bramble_server::config::{ResponseMode, ServerConfig};
use bramble_server::db::{MemoryProductStore, MemoryUserStore};
use bramble_server::routes;
use bramble_server::services::validate::FieldRules;
use bramble_server::state::AppState;

/// A running test instance of the app.
pub struct TestServer {
    /// Address the server is bound to.
    pub addr: SocketAddr,
    /// Base URL for requests, e.g. `http://127.0.0.1:54321`.
    pub base_url: String,
    /// The product store backing the instance, for direct inspection.
    pub products: Arc<MemoryProductStore>,
}

/// Spawn the full router on an ephemeral port with in-memory backends.
///
/// # Panics
///
/// Panics if the listener cannot be bound; tests have no meaningful way to
/// recover from that.
pub async fn spawn(mode: ResponseMode) -> TestServer {
    let config = test_config(mode);

    let products = Arc::new(MemoryProductStore::new());
    let state = AppState::new(
        config,
        Arc::new(MemoryUserStore::new()),
        products.clone(),
        Arc::new(FieldRules),
    );

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name("bramble_session")
        .with_secure(false);

    let app = routes::router(state).layer(session_layer);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    TestServer {
        addr,
        base_url: format!("http://{addr}"),
        products,
    }
}

fn test_config(mode: ResponseMode) -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://unused/test"),
        host: "127.0.0.1".parse().expect("valid test host"),
        port: 0,
        base_url: "http://localhost:0".to_string(),
        session_secret: SecretString::from("x".repeat(32)),
        response_mode: mode,
        store_timeout: Duration::from_secs(5),
        sentry_dsn: None,
    }
}

/// A client that holds session cookies and does not follow redirects, so
/// tests can assert on redirect targets directly.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Register an account and leave the client's session authenticated.
///
/// # Panics
///
/// Panics if the registration request fails or is rejected.
pub async fn register(client: &reqwest::Client, server: &TestServer, username: &str, password: &str) {
    let resp = client
        .post(format!("{}/register", server.base_url))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .expect("Failed to register");
    assert!(
        resp.status().is_success() || resp.status().is_redirection(),
        "registration rejected: {}",
        resp.status()
    );
}

/// Create a product through the API with the given form fields.
///
/// # Panics
///
/// Panics if the create request fails or is rejected.
pub async fn create_product(
    client: &reqwest::Client,
    server: &TestServer,
    fields: &[(&str, &str)],
) {
    let resp = client
        .post(format!("{}/products", server.base_url))
        .form(fields)
        .send()
        .await
        .expect("Failed to create product");
    assert!(
        resp.status().is_success() || resp.status().is_redirection(),
        "product create rejected: {}",
        resp.status()
    );
}
