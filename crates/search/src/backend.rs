//! Search backend contract.
//!
//! Adapters own connection management, retries and translation of
//! backend-specific failures; the core only sees [`BackendResponse`] or
//! [`BackendError`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_catalog::SearchDocument;

use crate::query::StructuredQuery;

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub document: SearchDocument,
    /// Present iff the query carried a text clause.
    pub score: Option<f64>,
}

/// One page of hits, already sorted, plus the total match count across all pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendResponse {
    pub hits: Vec<Hit>,
    pub total_matches: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Unreachable, timed out, or failed with a server-side error after retries.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Answered, but without the expected hits/score/total structure.
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short identifier used in logs (`memory`, `elasticsearch`).
    fn name(&self) -> &'static str;

    async fn execute(&self, query: &StructuredQuery) -> Result<BackendResponse, BackendError>;
}

#[async_trait]
impl<B> SearchBackend for Arc<B>
where
    B: SearchBackend + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn execute(&self, query: &StructuredQuery) -> Result<BackendResponse, BackendError> {
        (**self).execute(query).await
    }
}
