use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_search::SearchError;

pub fn search_error_to_response(err: SearchError) -> axum::response::Response {
    match err {
        SearchError::Validation(e) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "success": false,
                "error": "validation_error",
                "field": e.field,
                "message": e.message,
            })),
        )
            .into_response(),
        SearchError::BackendUnavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable", msg)
        }
        SearchError::MalformedBackendResponse(msg) => {
            json_error(StatusCode::BAD_GATEWAY, "malformed_backend_response", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
