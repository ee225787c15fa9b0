use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use storefront_search::SortField;

use crate::app::dto::HealthResponse;
use crate::app::services::AppServices;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
        uptime_secs: services.uptime_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn docs() -> impl IntoResponse {
    let sort_fields: Vec<&str> = SortField::ALL.iter().map(SortField::as_str).collect();
    Json(json!({
        "name": "Storefront Catalog Search API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Catalog search with free-text relevance, exact filters and dynamic attributes",
        "endpoints": {
            "search": {
                "GET /api/search/products": "Search products with filters and ranking"
            },
            "system": {
                "GET /health": "Health check endpoint",
                "GET /api/docs": "API documentation"
            }
        },
        "parameters": {
            "q": "free text (aliases: query, text), at most 200 characters",
            "category": "category id",
            "supplier": "supplier id",
            "brand": "exact brand, at most 100 characters",
            "minPrice": "inclusive lower price bound",
            "maxPrice": "inclusive upper price bound",
            "sortBy": sort_fields,
            "sortOrder": ["asc", "desc"],
            "page": "1-based page number",
            "pageSize": "results per page, 1 to 100 (alias: limit)",
            "<any other name>": "exact attribute filter, e.g. color=Red"
        },
        "examples": {
            "basicSearch": "/api/search/products?q=t-shirt&page=1&pageSize=20",
            "attributeSearch": "/api/search/products?color=Red&size=Medium&sortBy=popularity",
            "priceFilter": "/api/search/products?minPrice=10&maxPrice=100&sortBy=price&sortOrder=asc"
        }
    }))
}
