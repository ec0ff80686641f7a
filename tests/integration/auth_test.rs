//! Integration tests for the customer and admin session flows.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_customer_login_returns_tokens_without_password() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/customers/login",
            Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert!(data["accessToken"].is_string());
    assert!(data["refreshToken"].is_string());
    assert_eq!(data["account"]["identity"], "ada@example.com");
    assert_eq!(data["account"]["profile"]["firstName"], "Ada");
    assert!(data["account"].get("passwordHash").is_none());
    assert!(data["account"].get("sessionTokens").is_none());
}

#[tokio::test]
async fn test_customer_login_wrong_password() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/customers/login",
            Some(json!({ "email": "ada@example.com", "password": "wrong-pass-1" })),
            &[],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");

    let unknown = app
        .request(
            "POST",
            "/api/customers/login",
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
            &[],
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_missing_fields_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/customers/login",
            Some(json!({ "email": "ada@example.com" })),
            &[],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_verify_accepts_token_header_and_bearer() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;
    let (access, _) = app
        .login(
            "/api/customers/login",
            json!({ "email": "ada@example.com", "password": PASSWORD }),
        )
        .await;

    let via_header = app
        .request("GET", "/api/customers/verify", None, &[("token", access.as_str())])
        .await;
    assert_eq!(via_header.status, StatusCode::OK);
    assert_eq!(via_header.body["data"]["identity"], "ada@example.com");
    assert_eq!(via_header.body["data"]["role"], "customer");

    let bearer = format!("Bearer {access}");
    let via_bearer = app
        .request("GET", "/api/customers/verify", None, &[("authorization", bearer.as_str())])
        .await;
    assert_eq!(via_bearer.status, StatusCode::OK);

    let missing = app.request("GET", "/api/customers/verify", None, &[]).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request("GET", "/api/customers/verify", None, &[("token", "not-a-token")])
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_token_rejected_on_admin_routes() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;
    let (access, refresh) = app
        .login(
            "/api/customers/login",
            json!({ "email": "ada@example.com", "password": PASSWORD }),
        )
        .await;

    let verify = app
        .request("GET", "/api/admins/verify", None, &[("token", access.as_str())])
        .await;
    assert_eq!(verify.status, StatusCode::UNAUTHORIZED);

    let refreshed = app
        .request("POST", "/api/admins/refresh", Some(json!({ "token": refresh })), &[])
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_until_logout() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;
    let (access, refresh) = app
        .login(
            "/api/customers/login",
            json!({ "email": "ada@example.com", "password": PASSWORD }),
        )
        .await;

    let refreshed = app
        .request("POST", "/api/customers/refresh", Some(json!({ "token": refresh })), &[])
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    let new_access = refreshed.body["data"]["accessToken"].as_str().unwrap().to_string();
    assert_eq!(refreshed.body["data"]["account"]["identity"], "ada@example.com");

    let logout = app
        .request("POST", "/api/customers/logout", None, &[("token", new_access.as_str())])
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["data"]["revoked"], true);

    let after = app
        .request("POST", "/api/customers/refresh", Some(json!({ "token": refresh })), &[])
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    // Access tokens are stateless and stay valid until they expire.
    let verify = app
        .request("GET", "/api/customers/verify", None, &[("token", access.as_str())])
        .await;
    assert_eq!(verify.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_only_ends_one_device() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;
    let body = json!({ "email": "ada@example.com", "password": PASSWORD });
    let (_, phone) = app.login("/api/customers/login", body.clone()).await;
    let (_, laptop) = app.login("/api/customers/login", body).await;

    let revoke = app
        .request("POST", "/api/customers/revoke", Some(json!({ "token": phone })), &[])
        .await;
    assert_eq!(revoke.status, StatusCode::OK);
    assert_eq!(revoke.body["data"]["revoked"], true);

    let phone_refresh = app
        .request("POST", "/api/customers/refresh", Some(json!({ "token": phone })), &[])
        .await;
    assert_eq!(phone_refresh.status, StatusCode::UNAUTHORIZED);

    let laptop_refresh = app
        .request("POST", "/api/customers/refresh", Some(json!({ "token": laptop })), &[])
        .await;
    assert_eq!(laptop_refresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_login_carries_access_level() {
    let app = TestApp::new();
    app.create_admin("root").await;

    let (access, _) = app
        .login("/api/admins/login", json!({ "name": "root", "password": PASSWORD }))
        .await;

    let verify = app
        .request("GET", "/api/admins/verify", None, &[("token", access.as_str())])
        .await;
    assert_eq!(verify.status, StatusCode::OK);
    assert_eq!(verify.body["data"]["identity"], "root");
    assert_eq!(verify.body["data"]["role"], "admin");
    assert_eq!(verify.body["data"]["access"], "full");
}

#[tokio::test]
async fn test_health_reports_store_and_connections() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["store"], true);
    assert_eq!(response.body["data"]["connections"], 0);
}
