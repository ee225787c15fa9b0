//! Infrastructure layer: search backends, config, sample data.

pub mod config;
pub mod fixtures;
pub mod search_backend;

pub use config::{AppConfig, BackendKind, ConfigError, ElasticsearchConfig, RateLimitConfig};
pub use search_backend::{ElasticsearchBackend, InMemorySearchBackend};
