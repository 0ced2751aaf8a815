//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store handles and credential services
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response shapes that are not domain records
//! - `extract.rs`: extractors reporting rejections as API errors
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: services::AppServices) -> Router {
    let auth_state = middleware::AuthState {
        resolver: services.resolver.clone(),
    };
    let cors_state = middleware::CorsState {
        allowed_origins: services.allowed_origins.clone(),
    };

    // Protected routes: every request resolves a caller first.
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(axum::middleware::from_fn_with_state(
                    cors_state,
                    middleware::cors_middleware,
                ))
                .layer(Extension(Arc::new(services))),
        )
}
