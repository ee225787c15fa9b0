//! Configuration loading and representation.
//!
//! Values come from environment variables, read through a lookup function so
//! tests can supply a map instead of mutating the process environment.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use storefront_search::SearchConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Which search backend adapter the process talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-local index seeded with the sample catalog.
    Memory,
    Elasticsearch(ElasticsearchConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub index: String,
    pub max_retries: u32,
    /// The index's `index.max_result_window`; pages ending past it are never requested.
    pub max_result_window: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "products".to_string(),
            max_retries: 5,
            max_result_window: 10_000,
        }
    }
}

/// Fixed-window request budget per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    /// Key clients by the first `x-forwarded-for` entry instead of the peer address.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
            trust_proxy: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub search: SearchConfig,
    pub rate_limit: RateLimitConfig,
    /// Raw `LOG_LEVEL` directive, if set.
    pub log_level: Option<String>,
    /// Raw `LOG_FORMAT` value, if set.
    pub log_format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            backend: BackendKind::Memory,
            search: SearchConfig::default(),
            rate_limit: RateLimitConfig::default(),
            log_level: None,
            log_format: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source. Unset and blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let host = get("HOST").unwrap_or(defaults.host);
        let port = parse_or(get("PORT"), "PORT", defaults.port)?;

        let backend = match get("SEARCH_BACKEND").as_deref() {
            None | Some("memory") => BackendKind::Memory,
            Some("elasticsearch") => {
                let es = ElasticsearchConfig::default();
                let url = get("ELASTICSEARCH_URL").unwrap_or(es.url);
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::invalid(
                        "ELASTICSEARCH_URL",
                        format!("expected an http(s) URL, got {url:?}"),
                    ));
                }
                BackendKind::Elasticsearch(ElasticsearchConfig {
                    url: url.trim_end_matches('/').to_string(),
                    index: get("ELASTICSEARCH_INDEX").unwrap_or(es.index),
                    max_retries: parse_or(get("ELASTICSEARCH_MAX_RETRIES"), "ELASTICSEARCH_MAX_RETRIES", es.max_retries)?,
                    max_result_window: parse_or(
                        get("ELASTICSEARCH_MAX_RESULT_WINDOW"),
                        "ELASTICSEARCH_MAX_RESULT_WINDOW",
                        es.max_result_window,
                    )?,
                })
            }
            Some(other) => {
                return Err(ConfigError::invalid(
                    "SEARCH_BACKEND",
                    format!("expected `memory` or `elasticsearch`, got {other:?}"),
                ));
            }
        };

        let mut search = defaults.search;
        let timeout_ms: u64 = parse_or(
            get("SEARCH_TIMEOUT_MS"),
            "SEARCH_TIMEOUT_MS",
            search.backend_timeout.as_millis() as u64,
        )?;
        if timeout_ms == 0 {
            return Err(ConfigError::invalid("SEARCH_TIMEOUT_MS", "must be positive"));
        }
        search.backend_timeout = Duration::from_millis(timeout_ms);

        let max_requests = parse_or(
            get("RATE_LIMIT_MAX_REQUESTS"),
            "RATE_LIMIT_MAX_REQUESTS",
            defaults.rate_limit.max_requests,
        )?;
        let window_secs = parse_or(
            get("RATE_LIMIT_WINDOW_SECS"),
            "RATE_LIMIT_WINDOW_SECS",
            defaults.rate_limit.window.as_secs(),
        )?;
        if max_requests == 0 {
            return Err(ConfigError::invalid("RATE_LIMIT_MAX_REQUESTS", "must be positive"));
        }
        if window_secs == 0 {
            return Err(ConfigError::invalid("RATE_LIMIT_WINDOW_SECS", "must be positive"));
        }
        let trust_proxy = parse_or(
            get("RATE_LIMIT_TRUST_PROXY"),
            "RATE_LIMIT_TRUST_PROXY",
            defaults.rate_limit.trust_proxy,
        )?;

        Ok(Self {
            host,
            port,
            backend,
            search,
            rate_limit: RateLimitConfig {
                max_requests,
                window: Duration::from_secs(window_secs),
                trust_proxy,
            },
            log_level: get("LOG_LEVEL"),
            log_format: get("LOG_FORMAT"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|e| ConfigError::invalid(key, format!("{v:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.search.backend_timeout, Duration::from_secs(30));
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
        assert!(!config.rate_limit.trust_proxy);
    }

    #[test]
    fn elasticsearch_backend_reads_its_keys() {
        let config = load(&[
            ("SEARCH_BACKEND", "elasticsearch"),
            ("ELASTICSEARCH_URL", "http://search:9200/"),
            ("ELASTICSEARCH_INDEX", "catalog"),
            ("ELASTICSEARCH_MAX_RETRIES", "2"),
            ("ELASTICSEARCH_MAX_RESULT_WINDOW", "500"),
            ("SEARCH_TIMEOUT_MS", "1500"),
        ])
        .unwrap();
        assert_eq!(
            config.backend,
            BackendKind::Elasticsearch(ElasticsearchConfig {
                url: "http://search:9200".to_string(),
                index: "catalog".to_string(),
                max_retries: 2,
                max_result_window: 500,
            })
        );
        assert_eq!(config.search.backend_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn proxy_trust_is_opt_in() {
        assert!(load(&[("RATE_LIMIT_TRUST_PROXY", "true")]).unwrap().rate_limit.trust_proxy);
        assert!(!load(&[("RATE_LIMIT_TRUST_PROXY", "false")]).unwrap().rate_limit.trust_proxy);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("PORT", "  "), ("LOG_LEVEL", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn malformed_values_name_the_key() {
        let cases = [
            ("PORT", "eighty"),
            ("SEARCH_BACKEND", "solr"),
            ("SEARCH_TIMEOUT_MS", "0"),
            ("RATE_LIMIT_MAX_REQUESTS", "-1"),
            ("RATE_LIMIT_WINDOW_SECS", "0"),
            ("RATE_LIMIT_TRUST_PROXY", "yes"),
        ];
        for (key, value) in cases {
            match load(&[(key, value)]) {
                Err(ConfigError::Invalid { key: k, .. }) => assert_eq!(k, key),
                other => panic!("expected invalid {key}, got {other:?}"),
            }
        }

        let err = load(&[("SEARCH_BACKEND", "elasticsearch"), ("ELASTICSEARCH_URL", "search:9200")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ELASTICSEARCH_URL", .. }));
    }
}
