use axum::{routing::get, Router};

pub mod search;
pub mod system;

/// Router for the rate-limited `/api` surface.
pub fn router() -> Router {
    Router::new()
        .route("/api/search/products", get(search::search_products))
        .route("/api/docs", get(system::docs))
}
