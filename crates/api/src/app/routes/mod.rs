use axum::{
    Router,
    routing::{get, post},
};

pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod contacts;
pub mod forms;
pub mod inbox;
pub mod inventory;
pub mod staff;
pub mod system;

/// Endpoints reachable without a bearer token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .nest("/bookings", bookings::router())
        .nest("/contacts", contacts::router())
        .nest("/inventory", inventory::router())
        .nest("/forms", forms::router())
        .nest("/staff", staff::router())
        .nest("/analytics", analytics::router())
        .nest("/inbox", inbox::router())
}
