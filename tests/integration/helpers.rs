//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use storefront_api::{AppState, build_app};
use storefront_core::config::AppConfig;
use storefront_database::MemoryDocumentStore;
use storefront_entity::account::{AccountProfile, AdminAccess, AdminProfile, CustomerProfile};

/// Password used for seeded accounts.
pub const PASSWORD: &str = "secret-123";

/// Update hook key configured for tests.
pub const UPDATE_KEY: &str = "test-update-key";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for seeding and direct assertions
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application over an in-memory store
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.realtime.update_key = UPDATE_KEY.to_string();

        let store = Arc::new(MemoryDocumentStore::new());
        let state = AppState::build(config, store).expect("Failed to build state");
        let router = build_app(state.clone());

        Self { router, state }
    }

    /// Seed a confirmed customer account
    pub async fn create_customer(&self, email: &str) {
        let profile = CustomerProfile {
            first_name: "Ada".to_string(),
            city: "London".to_string(),
            ..CustomerProfile::default()
        };
        self.state
            .accounts
            .create_account(email, PASSWORD, AccountProfile::Customer(profile))
            .await
            .expect("Failed to create customer");
    }

    /// Seed an admin account
    pub async fn create_admin(&self, name: &str) {
        self.state
            .accounts
            .create_account(
                name,
                PASSWORD,
                AccountProfile::Admin(AdminProfile {
                    access: AdminAccess::Full,
                }),
            )
            .await
            .expect("Failed to create admin");
    }

    /// Log in and return `(access_token, refresh_token)`
    pub async fn login(&self, path: &str, body: Value) -> (String, String) {
        let response = self.request("POST", path, Some(body), &[]).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        let data = &response.body["data"];
        (
            data["accessToken"].as_str().expect("accessToken").to_string(),
            data["refreshToken"].as_str().expect("refreshToken").to_string(),
        )
    }

    /// Make a JSON request against the router
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral port and return its address
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local addr");
        let app = self.router.clone();

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server failed");
        });

        addr
    }
}

/// Response captured by [`TestApp::request`]
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
