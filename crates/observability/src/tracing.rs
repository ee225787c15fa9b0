//! Tracing/logging initialization.
//!
//! Filter directives come from `RUST_LOG`, then the configured level
//! (`LOG_LEVEL`), then `info`. Output is JSON lines unless `pretty` is asked for.

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// `json` or `pretty` (case-insensitive); anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "text" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Fallback filter directive when `RUST_LOG` is unset (e.g. `debug`,
    /// `storefront_search=trace,info`).
    pub level: Option<String>,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn new(level: Option<String>, format: Option<&str>) -> Self {
        Self {
            level,
            format: format.and_then(LogFormat::parse).unwrap_or_default(),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| match &self.level {
                Some(level) => EnvFilter::try_new(level),
                None => Ok(EnvFilter::new("info")),
            })
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = match config.format {
        LogFormat::Json => builder.json().with_target(false).try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
