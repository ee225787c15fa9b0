use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    Json,
};

use storefront_search::{RawParams, RawValue};

use crate::app::dto::Envelope;
use crate::app::errors;
use crate::app::services::AppServices;

/// `GET /api/search/products?q=..&color=..`
///
/// Every query parameter is handed to the search core as-is; names it does not
/// recognise become attribute filters.
pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let raw: RawParams = params
        .into_iter()
        .map(|(k, v)| (k, RawValue::Text(v)))
        .collect();

    match services.search.search(&raw).await {
        Ok(result) => Json(Envelope::ok(result)).into_response(),
        Err(e) => errors::search_error_to_response(e),
    }
}
