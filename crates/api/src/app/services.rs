//! Infrastructure wiring: picks the search backend and builds the search service.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use storefront_infra::fixtures::sample_catalog;
use storefront_infra::{AppConfig, BackendKind, ElasticsearchBackend, InMemorySearchBackend};
use storefront_search::{SearchBackend, SearchConfig, SearchService};

pub type DynBackend = Arc<dyn SearchBackend>;

/// Shared state handed to every handler.
pub struct AppServices {
    pub search: SearchService<DynBackend>,
    pub started_at: Instant,
}

impl AppServices {
    pub fn new(backend: DynBackend, config: SearchConfig) -> Self {
        Self {
            search: SearchService::new(backend, config),
            started_at: Instant::now(),
        }
    }

    /// In-memory backend seeded with the sample catalog.
    pub fn in_memory(config: SearchConfig) -> anyhow::Result<Self> {
        let catalog = sample_catalog().context("failed to build sample catalog")?;
        let backend = InMemorySearchBackend::with_documents(catalog.documents());
        tracing::info!(documents = backend.len(), "seeded in-memory search index");
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

pub fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    config
        .search
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid search configuration")?;

    match &config.backend {
        BackendKind::Memory => AppServices::in_memory(config.search.clone()),
        BackendKind::Elasticsearch(es) => {
            let backend = ElasticsearchBackend::new(es, config.search.backend_timeout)
                .context("failed to create elasticsearch backend")?;
            tracing::info!(url = backend.search_url(), max_retries = es.max_retries, "using elasticsearch backend");
            Ok(AppServices::new(Arc::new(backend), config.search.clone()))
        }
    }
}
