//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: backend selection and the shared search service
//! - `routes/`: HTTP handlers (search, system)
//! - `dto.rs`: response envelopes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Extension, Router};
use tower::ServiceBuilder;

use storefront_infra::RateLimitConfig;

use crate::middleware::{self, RateLimiter};

use self::services::AppServices;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `/api/*` is rate limited per client; `/health` is not.
pub fn build_app(services: Arc<AppServices>, rate_limit: RateLimitConfig) -> Router {
    let limiter = RateLimiter::new(rate_limit);

    let api = routes::router().layer(axum::middleware::from_fn_with_state(
        limiter,
        middleware::rate_limit,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(Extension(services)),
        )
}

async fn not_found(uri: axum::http::Uri) -> axum::response::Response {
    errors::json_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("Route {} not found", uri.path()),
    )
}
