//! Backend-agnostic structured query.
//!
//! A [`StructuredQuery`] is plain data: one optional scoring clause, a list of
//! AND-ed non-scoring filters, a total sort order and a page window. Backends
//! translate it; [`StructuredQuery::to_dsl`] renders the Elasticsearch form.

use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};

use storefront_catalog::document::fields;

use crate::ranking::PageWindow;
use crate::request::{SortField, SortOrder};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredQuery {
    pub query: BoolQuery,
    /// Most significant key first.
    pub sort: Vec<SortKey>,
    pub window: PageWindow,
}

impl StructuredQuery {
    /// The relevance clause, if any. Its presence is what makes hits carry scores.
    pub fn text_clause(&self) -> Option<&MultiMatch> {
        self.query.must.iter().find_map(|c| match c {
            Clause::MultiMatch(m) => Some(m),
            _ => None,
        })
    }

    pub fn is_scored(&self) -> bool {
        self.text_clause().is_some()
    }

    /// Deterministic Elasticsearch request body.
    pub fn to_dsl(&self) -> JsonValue {
        let mut bool_query = Map::new();
        if !self.query.must.is_empty() {
            bool_query.insert(
                "must".to_string(),
                JsonValue::Array(self.query.must.iter().map(Clause::to_dsl).collect()),
            );
        }
        if !self.query.filter.is_empty() {
            bool_query.insert(
                "filter".to_string(),
                JsonValue::Array(self.query.filter.iter().map(Clause::to_dsl).collect()),
            );
        }

        json!({
            "query": { "bool": bool_query },
            "sort": self.sort.iter().map(SortKey::to_dsl).collect::<Vec<_>>(),
            "from": self.window.offset(),
            "size": self.window.page_size,
            "track_total_hits": true,
        })
    }
}

/// `must` clauses score; `filter` clauses only restrict eligibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    pub must: Vec<Clause>,
    pub filter: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Clause {
    MultiMatch(MultiMatch),
    Term(Term),
    Range(Range),
}

impl Clause {
    pub fn to_dsl(&self) -> JsonValue {
        match self {
            Clause::MultiMatch(m) => json!({
                "multi_match": {
                    "query": m.query,
                    "fields": m.fields.iter().map(|f| f.to_dsl()).collect::<Vec<_>>(),
                    "type": "best_fields",
                    "tie_breaker": m.tie_breaker,
                    "minimum_should_match": format!("{}%", m.minimum_should_match_percent),
                }
            }),
            Clause::Term(t) => json!({ "term": { t.field.as_str(): t.value } }),
            Clause::Range(r) => {
                let mut bounds = Map::new();
                if let Some(gte) = r.gte {
                    bounds.insert("gte".to_string(), json!(gte));
                }
                if let Some(lte) = r.lte {
                    bounds.insert("lte".to_string(), json!(lte));
                }
                json!({ "range": { r.field.as_str(): bounds } })
            }
        }
    }
}

/// Best-fields match of `query` across weighted text fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMatch {
    pub query: String,
    pub fields: Vec<crate::config::FieldBoost>,
    pub tie_breaker: f64,
    pub minimum_should_match_percent: u8,
}

impl MultiMatch {
    /// Number of query terms a field has to contain, out of `term_count`.
    pub fn required_terms(&self, term_count: usize) -> usize {
        let required = term_count * usize::from(self.minimum_should_match_percent) / 100;
        required.clamp(1, term_count.max(1))
    }
}

/// Exact match on a keyword field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    pub field: String,
    pub value: String,
}

impl Term {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Inclusive numeric range; at least one bound is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Range {
    pub field: String,
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}

impl Range {
    pub fn contains(&self, value: f64) -> bool {
        self.gte.is_none_or(|min| value >= min) && self.lte.is_none_or(|max| value <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortTarget {
    Score,
    Field(SortField),
    /// Final tiebreak; makes the order total.
    Sku,
}

impl SortTarget {
    pub fn index_field(&self) -> &'static str {
        match self {
            SortTarget::Score => "_score",
            SortTarget::Field(f) => f.index_field(),
            SortTarget::Sku => fields::SKU,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub target: SortTarget,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(target: SortTarget, order: SortOrder) -> Self {
        Self { target, order }
    }

    pub fn to_dsl(&self) -> JsonValue {
        json!({ self.target.index_field(): { "order": self.order.as_dsl() } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelevanceConfig;

    fn text_clause(percent: u8) -> MultiMatch {
        let r = RelevanceConfig::default();
        MultiMatch {
            query: "red cotton shirt".to_string(),
            fields: r.fields,
            tie_breaker: r.tie_breaker,
            minimum_should_match_percent: percent,
        }
    }

    #[test]
    fn required_terms_rounds_down_but_never_below_one() {
        let m = text_clause(70);
        assert_eq!(m.required_terms(1), 1);
        assert_eq!(m.required_terms(2), 1);
        assert_eq!(m.required_terms(3), 2);
        assert_eq!(m.required_terms(10), 7);
        assert_eq!(text_clause(100).required_terms(3), 3);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let r = Range {
            field: fields::PRICE.to_string(),
            gte: Some(20.0),
            lte: Some(50.0),
        };
        assert!(r.contains(20.0));
        assert!(r.contains(50.0));
        assert!(!r.contains(19.99));
        assert!(!r.contains(50.01));

        let open = Range {
            field: fields::PRICE.to_string(),
            gte: None,
            lte: Some(10.0),
        };
        assert!(open.contains(0.0));
    }

    #[test]
    fn clauses_render_elasticsearch_dsl() {
        let dsl = Clause::MultiMatch(text_clause(70)).to_dsl();
        assert_eq!(
            dsl,
            json!({
                "multi_match": {
                    "query": "red cotton shirt",
                    "fields": ["name^2", "description", "brand^1.5"],
                    "type": "best_fields",
                    "tie_breaker": 0.3,
                    "minimum_should_match": "70%"
                }
            })
        );

        let term = Clause::Term(Term::new("attributes.color", "Red")).to_dsl();
        assert_eq!(term, json!({ "term": { "attributes.color": "Red" } }));

        let range = Clause::Range(Range {
            field: "price".to_string(),
            gte: Some(20.0),
            lte: None,
        })
        .to_dsl();
        assert_eq!(range, json!({ "range": { "price": { "gte": 20.0 } } }));
    }

    #[test]
    fn sort_key_renders_field_and_order() {
        let key = SortKey::new(SortTarget::Field(SortField::Name), SortOrder::Ascending);
        assert_eq!(key.to_dsl(), json!({ "name.keyword": { "order": "asc" } }));
        let score = SortKey::new(SortTarget::Score, SortOrder::Descending);
        assert_eq!(score.to_dsl(), json!({ "_score": { "order": "desc" } }));
    }
}
