//! Integration tests for signup, profile updates and admin credential changes.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_signup_confirm_and_login() {
    let app = TestApp::new();

    let signup = app
        .request(
            "POST",
            "/api/customers/signup",
            Some(json!({
                "email": "grace@example.com",
                "password": PASSWORD,
                "firstName": "Grace",
                "lastName": "Hopper",
                "city": "Arlington"
            })),
            &[],
        )
        .await;
    assert_eq!(signup.status, StatusCode::CREATED);
    assert_eq!(signup.body["data"]["email"], "grace@example.com");
    let token = signup.body["data"]["confirmationToken"]
        .as_str()
        .unwrap()
        .to_string();

    // Not an account until confirmed.
    let early = app
        .request(
            "POST",
            "/api/customers/login",
            Some(json!({ "email": "grace@example.com", "password": PASSWORD })),
            &[],
        )
        .await;
    assert_eq!(early.status, StatusCode::UNAUTHORIZED);

    let confirm = app
        .request("POST", "/api/customers/confirm", Some(json!({ "token": token })), &[])
        .await;
    assert_eq!(confirm.status, StatusCode::OK);
    assert_eq!(confirm.body["data"]["identity"], "grace@example.com");
    assert_eq!(confirm.body["data"]["profile"]["lastName"], "Hopper");

    let again = app
        .request("POST", "/api/customers/confirm", Some(json!({ "token": token })), &[])
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    app.login(
        "/api/customers/login",
        json!({ "email": "grace@example.com", "password": PASSWORD }),
    )
    .await;
}

#[tokio::test]
async fn test_signup_rejects_taken_email_and_bad_input() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;

    let taken = app
        .request(
            "POST",
            "/api/customers/signup",
            Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
            &[],
        )
        .await;
    assert_eq!(taken.status, StatusCode::BAD_REQUEST);

    let bad_email = app
        .request(
            "POST",
            "/api/customers/signup",
            Some(json!({ "email": "not-an-email", "password": PASSWORD })),
            &[],
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let weak = app
        .request(
            "POST",
            "/api/customers/signup",
            Some(json!({ "email": "new@example.com", "password": "short" })),
            &[],
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirm_unknown_token_is_not_found() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/api/customers/confirm", Some(json!({ "token": "nope" })), &[])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_customer_profile_update() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;
    let (access, _) = app
        .login(
            "/api/customers/login",
            json!({ "email": "ada@example.com", "password": PASSWORD }),
        )
        .await;

    let wrong = app
        .request(
            "PUT",
            "/api/customers",
            Some(json!({ "password": "wrong-pass-1", "city": "Paris" })),
            &[("token", access.as_str())],
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let updated = app
        .request(
            "PUT",
            "/api/customers",
            Some(json!({ "password": PASSWORD, "firstName": "Ada", "city": "Paris" })),
            &[("token", access.as_str())],
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["profile"]["city"], "Paris");

    let anonymous = app
        .request(
            "PUT",
            "/api/customers",
            Some(json!({ "password": PASSWORD, "city": "Rome" })),
            &[],
        )
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_password_change_revokes_sessions() {
    let app = TestApp::new();
    app.create_admin("root").await;
    let (access, refresh) = app
        .login("/api/admins/login", json!({ "name": "root", "password": PASSWORD }))
        .await;

    let changed = app
        .request(
            "PUT",
            "/api/admins",
            Some(json!({ "password": PASSWORD, "newPassword": "brand-new-789" })),
            &[("token", access.as_str())],
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    let refreshed = app
        .request("POST", "/api/admins/refresh", Some(json!({ "token": refresh })), &[])
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);

    let old = app
        .request(
            "POST",
            "/api/admins/login",
            Some(json!({ "name": "root", "password": PASSWORD })),
            &[],
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    app.login(
        "/api/admins/login",
        json!({ "name": "root", "password": "brand-new-789" }),
    )
    .await;
}
