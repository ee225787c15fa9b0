//! Search backend adapters.
//!
//! - [`InMemorySearchBackend`]: process-local reference engine for dev and tests
//! - [`ElasticsearchBackend`]: HTTP adapter for an Elasticsearch-compatible cluster
//!
//! Both implement [`storefront_search::SearchBackend`] and report failures as
//! [`storefront_search::BackendError`].

pub mod elasticsearch;
pub mod in_memory;

pub use elasticsearch::{parse_search_response, ElasticsearchBackend};
pub use in_memory::InMemorySearchBackend;
