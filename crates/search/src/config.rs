//! Tunable search constants.
//!
//! Defaults are contractual: changing them changes ranking and validation for
//! every client, so overrides should be deliberate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use storefront_catalog::document::fields;

/// A text field and its relative weight in the relevance clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBoost {
    pub field: String,
    pub boost: f64,
}

impl FieldBoost {
    pub fn new(field: impl Into<String>, boost: f64) -> Self {
        Self {
            field: field.into(),
            boost,
        }
    }

    /// `name^2`, `description`, `brand^1.5`.
    pub fn to_dsl(&self) -> String {
        if self.boost == 1.0 {
            self.field.clone()
        } else {
            format!("{}^{}", self.field, self.boost)
        }
    }
}

/// Parameters of the free-text relevance clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceConfig {
    /// Searched fields with weights (name 2, description 1, brand 1.5).
    pub fields: Vec<FieldBoost>,
    /// Share of the non-best matching fields' scores that still counts (0.3).
    pub tie_breaker: f64,
    /// Percentage of query terms a field must match for the document to qualify (70).
    pub minimum_should_match_percent: u8,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldBoost::new(fields::NAME, 2.0),
                FieldBoost::new(fields::DESCRIPTION, 1.0),
                FieldBoost::new(fields::BRAND, 1.5),
            ],
            tie_breaker: 0.3,
            minimum_should_match_percent: 70,
        }
    }
}

impl RelevanceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("relevance needs at least one text field".to_string());
        }
        if let Some(f) = self.fields.iter().find(|f| !(f.boost.is_finite() && f.boost > 0.0)) {
            return Err(format!("boost for {} must be positive", f.field));
        }
        if !(0.0..=1.0).contains(&self.tie_breaker) {
            return Err(format!("tie_breaker must be within [0, 1], got {}", self.tie_breaker));
        }
        if !(1..=100).contains(&self.minimum_should_match_percent) {
            return Err(format!(
                "minimum_should_match_percent must be within [1, 100], got {}",
                self.minimum_should_match_percent
            ));
        }
        Ok(())
    }
}

/// Input bounds enforced by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLimits {
    pub max_text_len: usize,
    pub max_brand_len: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_text_len: 200,
            max_brand_len: 100,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub relevance: RelevanceConfig,
    pub limits: RequestLimits,
    /// Upper bound on one backend round-trip before the search fails as unavailable.
    pub backend_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            relevance: RelevanceConfig::default(),
            limits: RequestLimits::default(),
            backend_timeout: Duration::from_secs(30),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.relevance.validate()?;
        let l = &self.limits;
        if l.max_page_size == 0 || l.default_page_size == 0 || l.default_page_size > l.max_page_size {
            return Err(format!(
                "page sizes must satisfy 1 <= default ({}) <= max ({})",
                l.default_page_size, l.max_page_size
            ));
        }
        if self.backend_timeout.is_zero() {
            return Err("backend_timeout must be non-zero".to_string());
        }
        Ok(())
    }
}
