//! Route table.

use axum::Router;
use axum::routing::{get, post, put};

use crate::handlers::{admins, customers, health, update, ws};
use crate::state::AppState;

/// Builds the route tree with all handlers attached to `state`.
pub fn build_router(state: AppState) -> Router {
    let customer_routes = Router::new()
        .route("/login", post(customers::login))
        .route("/refresh", post(customers::refresh))
        .route("/verify", get(customers::verify))
        .route("/logout", post(customers::logout))
        .route("/revoke", post(customers::revoke))
        .route("/signup", post(customers::signup))
        .route("/confirm", post(customers::confirm));

    let admin_routes = Router::new()
        .route("/login", post(admins::login))
        .route("/refresh", post(admins::refresh))
        .route("/verify", get(admins::verify))
        .route("/logout", post(admins::logout))
        .route("/revoke", post(admins::revoke));

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/customers", put(customers::update))
        .route("/admins", put(admins::change_password))
        .nest("/customers", customer_routes)
        .nest("/admins", admin_routes);

    Router::new()
        .nest("/api", api)
        .route("/ws", get(ws::ws_handler))
        .route("/update", post(update::publish))
        .with_state(state)
}
