//! `search(rawParams)` entry point.
//!
//! Normalize, compile, one bounded backend call, shape. The service holds no
//! mutable state; one instance serves any number of concurrent searches.

use std::time::Duration;

use crate::backend::{BackendError, SearchBackend};
use crate::compiler::QueryCompiler;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::normalizer::FilterNormalizer;
use crate::query::StructuredQuery;
use crate::ranking::{self, SearchResult};
use crate::request::{RawParams, SearchRequest};

#[derive(Debug, Clone)]
pub struct SearchService<B> {
    backend: B,
    normalizer: FilterNormalizer,
    compiler: QueryCompiler,
    timeout: Duration,
}

impl<B> SearchService<B>
where
    B: SearchBackend,
{
    pub fn new(backend: B, config: SearchConfig) -> Self {
        Self {
            backend,
            normalizer: FilterNormalizer::new(config.limits),
            compiler: QueryCompiler::new(config.relevance),
            timeout: config.backend_timeout,
        }
    }

    /// Normalize and compile without touching the backend.
    pub fn plan(&self, raw: &RawParams) -> Result<StructuredQuery, SearchError> {
        let request = self.normalizer.normalize(raw)?;
        Ok(self.compiler.compile(&request))
    }

    #[tracing::instrument(skip_all, fields(backend = self.backend.name()))]
    pub async fn search(&self, raw: &RawParams) -> Result<SearchResult, SearchError> {
        let request = self.normalizer.normalize(raw).inspect_err(|e| {
            tracing::debug!(field = %e.field, "rejected search request: {}", e.message);
        })?;
        self.search_request(&request).await
    }

    /// Runs an already-validated request.
    pub async fn search_request(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let query = self.compiler.compile(request);
        tracing::debug!(
            scored = query.is_scored(),
            filters = query.query.filter.len(),
            page = query.window.page,
            page_size = query.window.page_size,
            "compiled search query"
        );

        let response = match tokio::time::timeout(self.timeout, self.backend.execute(&query)).await {
            Ok(Ok(response)) => response,
            Ok(Err(BackendError::Unavailable(msg))) => {
                tracing::warn!(backend = self.backend.name(), "search backend unavailable: {msg}");
                return Err(SearchError::BackendUnavailable(msg));
            }
            Ok(Err(BackendError::Malformed(msg))) => {
                tracing::error!(
                    backend = self.backend.name(),
                    query = %query.to_dsl(),
                    "malformed search backend response: {msg}"
                );
                return Err(SearchError::MalformedBackendResponse(msg));
            }
            Err(_) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "search backend timed out"
                );
                return Err(SearchError::BackendUnavailable(format!(
                    "no response within {} ms",
                    self.timeout.as_millis()
                )));
            }
        };

        ranking::shape(&query, response).inspect_err(|e| {
            tracing::error!(query = %query.to_dsl(), "rejected search backend page: {e}");
        })
    }
}
