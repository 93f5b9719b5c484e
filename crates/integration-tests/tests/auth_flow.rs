//! Authentication flow tests: registration, login, logout, and the gating
//! of every protected route.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use bramble_integration_tests::{client, register, spawn};
use bramble_server::config::ResponseMode;

#[tokio::test]
async fn test_register_establishes_session() {
    let server = spawn(ResponseMode::Pages).await;
    let client = client();

    let resp = client
        .post(format!("{}/register", server.base_url))
        .form(&[("username", "alice"), ("password", "secret1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/products");

    // The session cookie from registration authenticates the next request
    let resp = client
        .get(format!("{}/products", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_register_rejected() {
    let server = spawn(ResponseMode::Pages).await;

    let first = client();
    register(&first, &server, "alice", "secret1").await;

    let second = client();
    let resp = second
        .post(format!("{}/register", server.base_url))
        .form(&[("username", "alice"), ("password", "other")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/login?error=account_exists");

    // The rejected attempt has no session
    let resp = second
        .get(format!("{}/products", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/login");
}

#[tokio::test]
async fn test_login_success_and_failures() {
    let server = spawn(ResponseMode::Pages).await;
    register(&client(), &server, "alice", "secret1").await;

    // Unknown user goes to registration
    let c = client();
    let resp = c
        .post(format!("{}/login", server.base_url))
        .form(&[("username", "nobody"), ("password", "secret1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "/register?error=unknown_user");

    // Wrong password goes back to login, and leaves no session behind
    let resp = c
        .post(format!("{}/login", server.base_url))
        .form(&[("username", "alice"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "/login?error=wrong_password");

    let resp = c
        .get(format!("{}/products", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "/login");

    // Correct credentials log in
    let resp = c
        .post(format!("{}/login", server.base_url))
        .form(&[("username", "alice"), ("password", "secret1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "/products");

    let resp = c
        .get(format!("{}/products", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let server = spawn(ResponseMode::Pages).await;
    let c = client();
    register(&c, &server, "alice", "secret1").await;

    let resp = c
        .get(format!("{}/logout", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");

    // The prior session no longer authenticates
    let resp = c
        .get(format!("{}/products", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/login");
}

#[tokio::test]
async fn test_every_protected_route_rejects_anonymous() {
    let server = spawn(ResponseMode::Pages).await;
    let c = client();

    let gets = [
        "/products",
        "/featuredItem",
        "/addItem",
        "/updateItem",
        "/deleteItem",
        "/lessItem",
        "/greaterItem",
    ];
    for path in gets {
        let resp = c
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(resp.headers()["location"], "/login", "GET {path}");
    }

    let posts = [
        "/products",
        "/updateProducts",
        "/deleteProducts",
        "/lessItem",
        "/greaterItem",
    ];
    for path in posts {
        let resp = c
            .post(format!("{}{path}", server.base_url))
            .form(&[("productID", "p1"), ("value", "1")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "POST {path}");
        assert_eq!(resp.headers()["location"], "/login", "POST {path}");
    }
}

#[tokio::test]
async fn test_public_routes_need_no_session() {
    let server = spawn(ResponseMode::Pages).await;
    let c = client();

    for path in ["/", "/login", "/register", "/health"] {
        let resp = c
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
    }

    // In-memory backend is always ready
    let resp = c
        .get(format!("{}/health/ready", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
