use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use storefront_catalog::SearchDocument;
use storefront_search::{BackendError, BackendResponse, Hit, SearchBackend, StructuredQuery};

use crate::config::ElasticsearchConfig;

/// Elasticsearch-compatible HTTP adapter.
///
/// POSTs the rendered query to `{url}/{index}/_search`. Transport failures and
/// 5xx answers are retried up to `max_retries` times with linear backoff; a 4xx
/// answer means the cluster rejected the query and is not retried.
///
/// The cluster refuses `from + size` past `index.max_result_window`, so a page
/// crossing it is cut at the window and a page beyond it only counts matches.
#[derive(Debug, Clone)]
pub struct ElasticsearchBackend {
    client: reqwest::Client,
    search_url: String,
    max_retries: u32,
    max_result_window: u64,
    retry_backoff: Duration,
}

impl ElasticsearchBackend {
    pub fn new(config: &ElasticsearchConfig, request_timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Unavailable(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            search_url: format!("{}/{}/_search", config.url.trim_end_matches('/'), config.index),
            max_retries: config.max_retries,
            max_result_window: config.max_result_window,
            retry_backoff: Duration::from_millis(200),
        })
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    fn request_body(&self, query: &StructuredQuery) -> JsonValue {
        let mut body = query.to_dsl();
        let offset = query.window.offset();
        let end = offset + u64::from(query.window.page_size);
        if end > self.max_result_window {
            let size = self.max_result_window.saturating_sub(offset);
            tracing::debug!(offset, size, max_result_window = self.max_result_window, "page crosses the result window");
            body["size"] = json!(size);
            if size == 0 {
                body["from"] = json!(0);
            }
        }
        body
    }

    async fn send_once(&self, body: &JsonValue) -> Result<JsonValue, Attempt> {
        let response = self
            .client
            .post(&self.search_url)
            .json(body)
            .send()
            .await
            .map_err(|e| Attempt::Retry(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Attempt::Retry(format!("server error {status}")));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Attempt::Fatal(BackendError::Malformed(format!(
                "query rejected with {status}: {}",
                truncate(&detail, 512)
            ))));
        }

        response
            .json::<JsonValue>()
            .await
            .map_err(|e| Attempt::Fatal(BackendError::Malformed(format!("response is not JSON: {e}"))))
    }
}

enum Attempt {
    Retry(String),
    Fatal(BackendError),
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    fn name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn execute(&self, query: &StructuredQuery) -> Result<BackendResponse, BackendError> {
        let body = self.request_body(query);
        let mut attempt = 0u32;
        loop {
            match self.send_once(&body).await {
                Ok(json) => return parse_search_response(&json),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(reason)) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(attempt, max_retries = self.max_retries, "retrying search request: {reason}");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(Attempt::Retry(reason)) => {
                    return Err(BackendError::Unavailable(format!(
                        "{reason} (after {} attempts)",
                        attempt + 1
                    )));
                }
            }
        }
    }
}

/// Decodes a `_search` response body.
///
/// Accepts both `hits.total: N` and `hits.total: {"value": N}`. A missing
/// `hits`, `total`, `hits.hits` or `_source`, or an undecodable document, is
/// [`BackendError::Malformed`]. `_score` may be null (sorted, unscored queries).
pub fn parse_search_response(body: &JsonValue) -> Result<BackendResponse, BackendError> {
    let malformed = |msg: &str| BackendError::Malformed(msg.to_string());

    let hits = body.get("hits").ok_or_else(|| malformed("missing `hits`"))?;
    let total_matches = match hits.get("total") {
        Some(JsonValue::Number(n)) => n.as_u64(),
        Some(JsonValue::Object(total)) => total.get("value").and_then(JsonValue::as_u64),
        _ => None,
    }
    .ok_or_else(|| malformed("missing or invalid `hits.total`"))?;

    let raw_hits = hits
        .get("hits")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| malformed("missing `hits.hits`"))?;

    let hits = raw_hits
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let source = raw
                .get("_source")
                .ok_or_else(|| BackendError::Malformed(format!("hit {i} has no `_source`")))?;
            let document: SearchDocument = serde_json::from_value(source.clone())
                .map_err(|e| BackendError::Malformed(format!("hit {i}: {e}")))?;
            let score = raw.get("_score").and_then(JsonValue::as_f64);
            Ok(Hit { document, score })
        })
        .collect::<Result<Vec<_>, BackendError>>()?;

    Ok(BackendResponse { hits, total_matches })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
