//! Query compiler: [`SearchRequest`] -> [`StructuredQuery`].
//!
//! Only the free-text clause scores. Category, supplier, brand, price and
//! attribute criteria are AND-ed `filter` clauses and never touch ranking.
//! Filter order is fixed (category, supplier, brand, price, attributes by name)
//! so the same request always compiles to the same query.

use storefront_catalog::document::fields;

use crate::config::RelevanceConfig;
use crate::query::{BoolQuery, Clause, MultiMatch, Range, StructuredQuery, Term};
use crate::ranking::{self, PageWindow};
use crate::request::SearchRequest;

#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    relevance: RelevanceConfig,
}

impl QueryCompiler {
    pub fn new(relevance: RelevanceConfig) -> Self {
        Self { relevance }
    }

    pub fn compile(&self, request: &SearchRequest) -> StructuredQuery {
        let mut query = BoolQuery::default();

        if request.has_text() {
            query.must.push(Clause::MultiMatch(MultiMatch {
                query: request.text.clone(),
                fields: self.relevance.fields.clone(),
                tie_breaker: self.relevance.tie_breaker,
                minimum_should_match_percent: self.relevance.minimum_should_match_percent,
            }));
        }

        if let Some(category) = &request.category {
            query.filter.push(Clause::Term(Term::new(fields::CATEGORY_ID, category)));
        }
        if let Some(supplier) = &request.supplier {
            query.filter.push(Clause::Term(Term::new(fields::SUPPLIER_ID, supplier)));
        }
        if let Some(brand) = &request.brand {
            query.filter.push(Clause::Term(Term::new(fields::BRAND_KEYWORD, brand)));
        }
        if request.min_price.is_some() || request.max_price.is_some() {
            query.filter.push(Clause::Range(Range {
                field: fields::PRICE.to_string(),
                gte: request.min_price,
                lte: request.max_price,
            }));
        }
        for (name, value) in &request.attribute_filters {
            query
                .filter
                .push(Clause::Term(Term::new(fields::attribute_field(name), value)));
        }

        StructuredQuery {
            query,
            sort: ranking::sort_keys(request),
            window: PageWindow::new(request.page, request.page_size),
        }
    }
}
