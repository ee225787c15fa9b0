//! Catalog search core.
//!
//! Raw request parameters flow through four stages:
//!
//! ```text
//! RawParams
//!   ↓ normalizer   (typed SearchRequest, named vs. dynamic attribute filters)
//!   ↓ compiler     (StructuredQuery: scored `must` + unscored `filter` clauses)
//!   ↓ backend      (external inverted index, behind the SearchBackend trait)
//!   ↓ ranking      (sort precedence, page window, response envelope)
//! SearchResult
//! ```
//!
//! Everything except the backend call is pure and deterministic; `SearchService`
//! is stateless and safe to share across concurrent requests.

pub mod backend;
pub mod compiler;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod query;
pub mod ranking;
pub mod request;
pub mod service;

pub use backend::{BackendError, BackendResponse, Hit, SearchBackend};
pub use compiler::QueryCompiler;
pub use config::{FieldBoost, RelevanceConfig, RequestLimits, SearchConfig};
pub use error::{SearchError, ValidationError};
pub use normalizer::FilterNormalizer;
pub use query::{BoolQuery, Clause, MultiMatch, Range, SortKey, SortTarget, StructuredQuery, Term};
pub use ranking::{PageWindow, Pagination, RankedItem, SearchResult};
pub use request::{RawParams, RawValue, SearchRequest, SortField, SortOrder};
pub use service::SearchService;
