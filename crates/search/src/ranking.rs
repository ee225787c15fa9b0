//! Ranking & pagination engine.
//!
//! Owns sort precedence, page-window arithmetic and the response envelope.
//! Relevance always outranks the requested sort field while text search is active.

use std::cmp::Ordering;

use serde::Serialize;

use storefront_catalog::SearchDocument;

use crate::backend::{BackendResponse, Hit};
use crate::error::SearchError;
use crate::query::{SortKey, SortTarget, StructuredQuery};
use crate::request::{SearchRequest, SortField, SortOrder};

/// Sort keys for a request, most significant first.
///
/// With text: `_score desc`, then the requested field. Without text: the
/// requested field alone. `sku asc` always closes the list so the order is total.
pub fn sort_keys(request: &SearchRequest) -> Vec<SortKey> {
    let mut keys = Vec::with_capacity(3);
    if request.has_text() {
        keys.push(SortKey::new(SortTarget::Score, SortOrder::Descending));
    }
    keys.push(SortKey::new(SortTarget::Field(request.sort_by), request.sort_order));
    keys.push(SortKey::new(SortTarget::Sku, SortOrder::Ascending));
    keys
}

/// 1-based page and its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
}

impl PageWindow {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Zero-based index of the first document on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// The window's slice of `len` ordered items (empty past the end).
    pub fn slice_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(self.page_size as usize).min(len);
        start..end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub total_matches: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(window: PageWindow, total_matches: u64) -> Self {
        let size = u64::from(window.page_size.max(1));
        Self {
            page: window.page,
            page_size: window.page_size,
            total_pages: total_matches.div_ceil(size),
            total_matches,
            has_next_page: u64::from(window.page) * size < total_matches,
            has_prev_page: window.page > 1,
        }
    }
}

/// A document on the result page, with its relevance score when text search ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    #[serde(flatten)]
    pub document: SearchDocument,
    pub score: Option<f64>,
}

/// Response envelope: `items` plus the pagination fields, flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<RankedItem>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl SortKey {
    /// Orders two hits by this key alone.
    ///
    /// Missing values (no score, no `created_at`) sort last in either direction.
    pub fn compare(&self, a: &Hit, b: &Hit) -> Ordering {
        let ordering = match self.target {
            SortTarget::Score => return directed_optional(a.score, b.score, self.order),
            SortTarget::Sku => a.document.sku.cmp(&b.document.sku),
            SortTarget::Field(field) => {
                let (x, y) = (&a.document, &b.document);
                match field {
                    SortField::Popularity => x.sales_total_sold.cmp(&y.sales_total_sold),
                    SortField::Views => x.view_count.cmp(&y.view_count),
                    SortField::Rating => x.review_score.total_cmp(&y.review_score),
                    SortField::Name => x.name.cmp(&y.name),
                    SortField::Price => x.price.total_cmp(&y.price),
                    SortField::CreatedAt => {
                        return directed_optional(x.created_at, y.created_at, self.order);
                    }
                }
            }
        };
        directed(ordering, self.order)
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

fn directed_optional<T: PartialOrd>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(x.partial_cmp(&y).unwrap_or(Ordering::Equal), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Lexicographic comparison over a full key list.
pub fn compare_hits(keys: &[SortKey], a: &Hit, b: &Hit) -> Ordering {
    keys.iter()
        .map(|k| k.compare(a, b))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Checks a backend page against the query that produced it and builds the envelope.
///
/// The backend is trusted for order and scores but not for structure: a scored
/// query whose hits lack scores, or a page larger than requested, is malformed.
pub fn shape(query: &StructuredQuery, response: BackendResponse) -> Result<SearchResult, SearchError> {
    let window = query.window;
    let scored = query.is_scored();

    if response.hits.len() > window.page_size as usize {
        return Err(SearchError::MalformedBackendResponse(format!(
            "backend returned {} hits for a page of {}",
            response.hits.len(),
            window.page_size
        )));
    }
    let seen = window.offset() + response.hits.len() as u64;
    if !response.hits.is_empty() && seen > response.total_matches {
        return Err(SearchError::MalformedBackendResponse(format!(
            "total matches {} is below the {} hits already seen",
            response.total_matches, seen
        )));
    }

    let mut items = Vec::with_capacity(response.hits.len());
    for hit in response.hits {
        let score = if scored {
            match hit.score {
                Some(s) if s.is_finite() => Some(s),
                _ => {
                    return Err(SearchError::MalformedBackendResponse(format!(
                        "hit {} has no relevance score",
                        hit.document.sku
                    )));
                }
            }
        } else {
            None
        };
        items.push(RankedItem {
            document: hit.document,
            score,
        });
    }

    Ok(SearchResult {
        items,
        pagination: Pagination::new(window, response.total_matches),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::BoolQuery;
    use proptest::prelude::*;
    use storefront_catalog::SearchDocument;

    fn doc(sku: &str, price: f64, sold: u64) -> SearchDocument {
        SearchDocument {
            sku: sku.to_string(),
            product_id: "p".to_string(),
            name: sku.to_string(),
            description: None,
            brand: None,
            category_id: "c".to_string(),
            category_name: None,
            supplier_id: "s".to_string(),
            supplier_name: None,
            attributes: Default::default(),
            price,
            currency: "USD".to_string(),
            inventory_available: 0,
            sales_total_sold: sold,
            view_count: 0,
            review_score: 0.0,
            created_at: None,
            tags: Vec::new(),
        }
    }

    fn hit(sku: &str, price: f64, score: Option<f64>) -> Hit {
        Hit {
            document: doc(sku, price, 0),
            score,
        }
    }

    fn query(scored: bool, page: u32, page_size: u32) -> StructuredQuery {
        let mut request = SearchRequest {
            page,
            page_size,
            ..SearchRequest::default()
        };
        if scored {
            request.text = "shirt".to_string();
        }
        crate::QueryCompiler::default().compile(&request)
    }

    #[test]
    fn text_search_puts_score_first() {
        let request = SearchRequest {
            text: "shirt".to_string(),
            sort_by: SortField::Price,
            sort_order: SortOrder::Ascending,
            ..SearchRequest::default()
        };
        let keys = sort_keys(&request);
        assert_eq!(keys[0], SortKey::new(SortTarget::Score, SortOrder::Descending));
        assert_eq!(keys[1], SortKey::new(SortTarget::Field(SortField::Price), SortOrder::Ascending));
        assert_eq!(keys[2].target, SortTarget::Sku);
    }

    #[test]
    fn without_text_requested_field_is_primary() {
        let keys = sort_keys(&SearchRequest::default());
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], SortKey::new(SortTarget::Field(SortField::Popularity), SortOrder::Descending));
    }

    #[test]
    fn relevance_outranks_requested_field() {
        let keys = vec![
            SortKey::new(SortTarget::Score, SortOrder::Descending),
            SortKey::new(SortTarget::Field(SortField::Price), SortOrder::Ascending),
        ];
        let cheap_weak = hit("a", 1.0, Some(0.5));
        let pricey_strong = hit("b", 99.0, Some(2.0));
        let pricey_weak = hit("c", 99.0, Some(0.5));
        assert_eq!(compare_hits(&keys, &pricey_strong, &cheap_weak), Ordering::Less);
        assert_eq!(compare_hits(&keys, &cheap_weak, &pricey_weak), Ordering::Less);
    }

    #[test]
    fn missing_values_sort_last_both_ways() {
        let dated = {
            let mut h = hit("a", 1.0, None);
            h.document.created_at = Some(chrono_now());
            h
        };
        let undated = hit("b", 1.0, None);
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let key = SortKey::new(SortTarget::Field(SortField::CreatedAt), order);
            assert_eq!(key.compare(&dated, &undated), Ordering::Less);
        }
    }

    fn chrono_now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }

    #[test]
    fn window_offsets() {
        assert_eq!(PageWindow::new(1, 20).offset(), 0);
        assert_eq!(PageWindow::new(3, 10).offset(), 20);
        assert_eq!(PageWindow::new(3, 10).slice_range(25), 20..25);
        assert_eq!(PageWindow::new(4, 10).slice_range(25), 25..25);
    }

    #[test]
    fn scored_query_requires_scores() {
        let q = query(true, 1, 20);
        let response = BackendResponse {
            hits: vec![hit("a", 1.0, Some(1.2)), hit("b", 2.0, None)],
            total_matches: 2,
        };
        assert!(matches!(shape(&q, response), Err(SearchError::MalformedBackendResponse(_))));
    }

    #[test]
    fn unscored_query_drops_scores() {
        let q = query(false, 1, 20);
        let response = BackendResponse {
            hits: vec![hit("a", 1.0, Some(1.0))],
            total_matches: 1,
        };
        let result = shape(&q, response).unwrap();
        assert_eq!(result.items[0].score, None);
    }

    #[test]
    fn oversized_page_is_malformed() {
        let q = query(false, 1, 1);
        let response = BackendResponse {
            hits: vec![hit("a", 1.0, None), hit("b", 1.0, None)],
            total_matches: 2,
        };
        assert!(shape(&q, response).is_err());
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let q = query(false, 9, 20);
        let result = shape(
            &q,
            BackendResponse {
                hits: Vec::new(),
                total_matches: 2,
            },
        )
        .unwrap();
        assert!(result.items.is_empty());
        assert!(!result.pagination.has_next_page);
        assert!(result.pagination.has_prev_page);
        assert_eq!(result.pagination.total_pages, 1);
    }

    #[test]
    fn envelope_serializes_flat_camel_case() {
        let q = StructuredQuery {
            query: BoolQuery::default(),
            sort: Vec::new(),
            window: PageWindow::new(1, 20),
        };
        let result = shape(
            &q,
            BackendResponse {
                hits: vec![hit("TSHIRT-RED-M", 25.0, None)],
                total_matches: 1,
            },
        )
        .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["pageSize"], 20);
        assert_eq!(json["hasNextPage"], false);
        assert_eq!(json["items"][0]["sku"], "TSHIRT-RED-M");
        assert!(json["items"][0]["score"].is_null());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: page count and navigation flags follow from the arithmetic alone.
        #[test]
        fn pagination_invariants(total in 0u64..10_000, page in 1u32..600, size in 1u32..=100) {
            let p = Pagination::new(PageWindow::new(page, size), total);
            let size = u64::from(size);
            prop_assert_eq!(p.total_pages, (total + size - 1) / size);
            prop_assert_eq!(p.has_next_page, u64::from(page) * size < total);
            prop_assert_eq!(p.has_prev_page, page > 1);
            if u64::from(page) > p.total_pages {
                prop_assert!(!p.has_next_page);
            }
        }
    }
}
