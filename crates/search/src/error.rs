//! Search error model.

use thiserror::Error;

/// A request parameter failed type or range checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid parameter `{field}`: {message}")]
pub struct ValidationError {
    /// Name of the offending parameter as the caller sent it (e.g. `minPrice`).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Everything `SearchService::search` can fail with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Malformed or out-of-range input. Never retried.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend was unreachable or did not answer in time. Safe to retry.
    #[error("search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered, but without the expected hits/score/total structure.
    #[error("malformed backend response: {0}")]
    MalformedBackendResponse(String),
}

impl SearchError {
    /// Whether re-issuing the same request may succeed. Compiled queries are pure,
    /// so retrying never has side effects.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::BackendUnavailable(_))
    }

    pub fn validation_field(&self) -> Option<&str> {
        match self {
            SearchError::Validation(e) => Some(&e.field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_backend_unavailable_is_retryable() {
        assert!(SearchError::BackendUnavailable("timeout".into()).is_retryable());
        assert!(!SearchError::MalformedBackendResponse("no hits".into()).is_retryable());
        assert!(!SearchError::from(ValidationError::new("page", "must be >= 1")).is_retryable());
    }

    #[test]
    fn validation_message_names_field() {
        let err = SearchError::from(ValidationError::new("minPrice", "must be >= 0"));
        assert_eq!(err.to_string(), "invalid parameter `minPrice`: must be >= 0");
        assert_eq!(err.validation_field(), Some("minPrice"));
    }
}
