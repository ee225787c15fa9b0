use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use storefront_catalog::document::fields;
use storefront_catalog::SearchDocument;
use storefront_search::ranking::compare_hits;
use storefront_search::{
    BackendError, BackendResponse, Clause, Hit, MultiMatch, SearchBackend, StructuredQuery, Term,
};

/// In-memory search index.
///
/// Evaluates a [`StructuredQuery`] with the same semantics the compiled DSL has
/// on Elasticsearch: best-fields relevance over the boosted text fields, exact
/// term filters, inclusive ranges, then sort and page window. Intended for
/// tests/dev. Linear scan; not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemorySearchBackend {
    documents: RwLock<Vec<SearchDocument>>,
}

impl InMemorySearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = SearchDocument>) -> Self {
        let backend = Self::new();
        for doc in documents {
            backend.index(doc);
        }
        backend
    }

    // Writers swap whole documents, so a poisoned lock still guards a consistent index.
    fn read(&self) -> RwLockReadGuard<'_, Vec<SearchDocument>> {
        self.documents.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<SearchDocument>> {
        self.documents.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or replace (by SKU) one document.
    pub fn index(&self, document: SearchDocument) {
        let mut docs = self.write();
        match docs.iter_mut().find(|d| d.sku == document.sku) {
            Some(existing) => *existing = document,
            None => docs.push(document),
        }
    }

    pub fn remove(&self, sku: &str) -> bool {
        let mut docs = self.write();
        let before = docs.len();
        docs.retain(|d| d.sku != sku);
        docs.len() != before
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SearchBackend for InMemorySearchBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn execute(&self, query: &StructuredQuery) -> Result<BackendResponse, BackendError> {
        let docs = self.read();

        let text = query.text_clause();
        let mut hits: Vec<Hit> = docs
            .iter()
            .filter(|doc| query.query.filter.iter().all(|clause| matches_filter(clause, doc)))
            .filter_map(|doc| {
                let score = match text {
                    Some(m) => Some(relevance(m, doc)?),
                    None => None,
                };
                Some(Hit {
                    document: doc.clone(),
                    score,
                })
            })
            .collect();
        drop(docs);

        let total_matches = hits.len() as u64;
        hits.sort_by(|a, b| compare_hits(&query.sort, a, b));
        let page = hits.drain(query.window.slice_range(hits.len())).collect();

        Ok(BackendResponse {
            hits: page,
            total_matches,
        })
    }
}

fn matches_filter(clause: &Clause, doc: &SearchDocument) -> bool {
    match clause {
        Clause::Term(term) => matches_term(term, doc),
        Clause::Range(range) => numeric_field(&range.field, doc).is_some_and(|v| range.contains(v)),
        // A scoring clause in filter position still has to match.
        Clause::MultiMatch(m) => relevance(m, doc).is_some(),
    }
}

/// Exact, case-sensitive comparison against the unanalyzed value.
fn matches_term(term: &Term, doc: &SearchDocument) -> bool {
    let value = term.value.as_str();
    match term.field.as_str() {
        fields::SKU => doc.sku == value,
        fields::PRODUCT_ID => doc.product_id == value,
        fields::CATEGORY_ID => doc.category_id == value,
        fields::SUPPLIER_ID => doc.supplier_id == value,
        fields::BRAND_KEYWORD | fields::BRAND => doc.brand.as_deref() == Some(value),
        fields::CURRENCY => doc.currency == value,
        fields::TAGS => doc.tags.iter().any(|t| t == value),
        field => fields::attribute_name(field).is_some_and(|name| doc.attribute(name) == Some(value)),
    }
}

fn numeric_field(field: &str, doc: &SearchDocument) -> Option<f64> {
    match field {
        fields::PRICE => Some(doc.price),
        fields::INVENTORY_AVAILABLE => Some(doc.inventory_available as f64),
        fields::SALES_TOTAL_SOLD => Some(doc.sales_total_sold as f64),
        fields::VIEW_COUNT => Some(doc.view_count as f64),
        fields::REVIEW_SCORE => Some(doc.review_score),
        field => fields::attribute_name(field)
            .and_then(|name| doc.attribute(name))
            .and_then(|v| v.parse().ok()),
    }
}

fn text_field<'a>(field: &str, doc: &'a SearchDocument) -> Option<&'a str> {
    match field {
        fields::NAME => Some(&doc.name),
        fields::DESCRIPTION => doc.description.as_deref(),
        fields::BRAND => doc.brand.as_deref(),
        fields::CATEGORY_NAME => doc.category_name.as_deref(),
        fields::SUPPLIER_NAME => doc.supplier_name.as_deref(),
        _ => None,
    }
}

/// Lowercased alphanumeric runs.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Best-fields score, or `None` when no field covers enough query terms.
///
/// Each field scores `boost * matched / terms` if it matches at least the
/// required number of terms. The best field counts fully; every other
/// qualifying field adds `tie_breaker` times its score.
fn relevance(m: &MultiMatch, doc: &SearchDocument) -> Option<f64> {
    let terms: BTreeSet<String> = tokenize(&m.query).collect();
    if terms.is_empty() {
        return None;
    }
    let required = m.required_terms(terms.len());

    let mut scores: Vec<f64> = m
        .fields
        .iter()
        .filter_map(|f| {
            let tokens: BTreeSet<String> = tokenize(text_field(&f.field, doc)?).collect();
            let matched = terms.iter().filter(|t| tokens.contains(*t)).count();
            (matched >= required).then(|| f.boost * matched as f64 / terms.len() as f64)
        })
        .collect();
    if scores.is_empty() {
        return None;
    }

    scores.sort_by(|a, b| b.total_cmp(a));
    let best = scores[0];
    let rest: f64 = scores[1..].iter().sum();
    Some(best + m.tie_breaker * rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use storefront_search::{QueryCompiler, SearchRequest, SortField, SortOrder};

    fn doc(sku: &str, name: &str, brand: &str, price: f64, attrs: &[(&str, &str)]) -> SearchDocument {
        SearchDocument {
            sku: sku.to_string(),
            product_id: format!("p-{name}"),
            name: name.to_string(),
            description: Some("Comfortable cotton wear".to_string()),
            brand: Some(brand.to_string()),
            category_id: "fashion".to_string(),
            category_name: Some("Fashion".to_string()),
            supplier_id: "hub".to_string(),
            supplier_name: None,
            attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            price,
            currency: "USD".to_string(),
            inventory_available: 10,
            sales_total_sold: (price * 10.0) as u64,
            view_count: 0,
            review_score: 4.0,
            created_at: None,
            tags: Vec::new(),
        }
    }

    fn backend() -> InMemorySearchBackend {
        InMemorySearchBackend::with_documents([
            doc("TS-RED-S", "Classic T-Shirt", "ComfortWear", 25.99, &[("color", "Red"), ("size", "Small")]),
            doc("TS-RED-M", "Classic T-Shirt", "ComfortWear", 25.99, &[("color", "Red"), ("size", "Medium")]),
            doc("TS-GRN-M", "Classic T-Shirt", "ComfortWear", 23.99, &[("color", "Green"), ("size", "Medium")]),
            doc("JEANS-30", "Premium Jeans", "DenimCraft", 79.99, &[("color", "Blue")]),
            doc("APPLES-1", "Organic Apples", "FreshFarms", 4.99, &[("weight", "1 lb")]),
        ])
    }

    #[tokio::test]
    async fn keeps_indexing_after_a_writer_panics() {
        let backend = std::sync::Arc::new(backend());
        let poisoner = backend.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.documents.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(backend.documents.is_poisoned());

        backend.index(doc("TS-BLU-L", "Classic T-Shirt", "ComfortWear", 25.99, &[("color", "Blue")]));
        assert_eq!(backend.len(), 6);
        assert!(backend.remove("APPLES-1"));
        assert_eq!(backend.len(), 5);

        let query = QueryCompiler::default().compile(&SearchRequest::default());
        assert_eq!(backend.execute(&query).await.unwrap().total_matches, 5);
    }

    async fn run(request: SearchRequest) -> BackendResponse {
        let query = QueryCompiler::default().compile(&request);
        backend().execute(&query).await.unwrap()
    }

    fn skus(response: &BackendResponse) -> Vec<&str> {
        response.hits.iter().map(|h| h.document.sku.as_str()).collect()
    }

    #[tokio::test]
    async fn text_and_attribute_filter() {
        let response = run(SearchRequest {
            text: "t-shirt".to_string(),
            attribute_filters: BTreeMap::from([("color".to_string(), "Red".to_string())]),
            ..SearchRequest::default()
        })
        .await;

        assert_eq!(response.total_matches, 2);
        assert!(response.hits.iter().all(|h| h.score.is_some()));
        // Equal scores and sales; sku breaks the tie.
        assert_eq!(skus(&response), vec!["TS-RED-M", "TS-RED-S"]);
    }

    #[tokio::test]
    async fn price_range_sorted_ascending_without_scores() {
        let response = run(SearchRequest {
            min_price: Some(20.0),
            max_price: Some(50.0),
            sort_by: SortField::Price,
            sort_order: SortOrder::Ascending,
            ..SearchRequest::default()
        })
        .await;

        assert_eq!(skus(&response), vec!["TS-GRN-M", "TS-RED-M", "TS-RED-S"]);
        assert!(response.hits.iter().all(|h| h.score.is_none()));
    }

    #[tokio::test]
    async fn brand_filter_is_exact() {
        let exact = run(SearchRequest {
            brand: Some("DenimCraft".to_string()),
            ..SearchRequest::default()
        })
        .await;
        assert_eq!(skus(&exact), vec!["JEANS-30"]);

        let lowercase = run(SearchRequest {
            brand: Some("denimcraft".to_string()),
            ..SearchRequest::default()
        })
        .await;
        assert_eq!(lowercase.total_matches, 0);
    }

    #[tokio::test]
    async fn minimum_should_match_excludes_weak_matches() {
        // 3 terms, 70% -> 2 required in a single field.
        let response = run(SearchRequest {
            text: "organic red apples".to_string(),
            ..SearchRequest::default()
        })
        .await;
        assert_eq!(skus(&response), vec!["APPLES-1"]);
    }

    #[tokio::test]
    async fn name_outweighs_description() {
        let backend = InMemorySearchBackend::with_documents([
            doc("A", "Cotton Scarf", "Knit", 10.0, &[]),
            doc("B", "Wool Scarf", "Knit", 10.0, &[]),
        ]);
        let query = QueryCompiler::default().compile(&SearchRequest {
            text: "cotton".to_string(),
            ..SearchRequest::default()
        });
        let response = backend.execute(&query).await.unwrap();
        // Both match (description mentions cotton); the name match ranks first.
        assert_eq!(skus(&response), vec!["A", "B"]);
        let (a, b) = (response.hits[0].score.unwrap(), response.hits[1].score.unwrap());
        assert!(a > b);
    }

    #[tokio::test]
    async fn filtered_attribute_does_not_change_score() {
        let text = SearchRequest {
            text: "t-shirt".to_string(),
            ..SearchRequest::default()
        };
        let unfiltered = run(text.clone()).await;
        let filtered = run(SearchRequest {
            attribute_filters: BTreeMap::from([("size".to_string(), "Medium".to_string())]),
            ..text
        })
        .await;

        for hit in &filtered.hits {
            let same = unfiltered
                .hits
                .iter()
                .find(|h| h.document.sku == hit.document.sku)
                .unwrap();
            assert_eq!(same.score, hit.score);
        }
    }

    #[tokio::test]
    async fn page_window_and_total() {
        let response = run(SearchRequest {
            sort_by: SortField::Price,
            sort_order: SortOrder::Descending,
            page: 2,
            page_size: 2,
            ..SearchRequest::default()
        })
        .await;
        assert_eq!(response.total_matches, 5);
        assert_eq!(response.hits.len(), 2);

        let past_end = run(SearchRequest {
            page: 4,
            page_size: 2,
            ..SearchRequest::default()
        })
        .await;
        assert!(past_end.hits.is_empty());
        assert_eq!(past_end.total_matches, 5);
    }

    #[test]
    fn index_replaces_by_sku() {
        let backend = backend();
        assert_eq!(backend.len(), 5);
        backend.index(doc("TS-RED-S", "Classic T-Shirt", "ComfortWear", 19.99, &[]));
        assert_eq!(backend.len(), 5);
        assert!(backend.remove("TS-RED-S"));
        assert!(!backend.remove("TS-RED-S"));
        assert_eq!(backend.len(), 4);
    }

    #[test]
    fn tokenizer_splits_on_punctuation() {
        let tokens: Vec<String> = tokenize("T-Shirt, V-Neck!").collect();
        assert_eq!(tokens, vec!["t", "shirt", "v", "neck"]);
    }
}
