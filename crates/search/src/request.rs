//! Typed search request and its raw input form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storefront_catalog::document::fields;

/// A raw parameter value as received from a request (query string or JSON body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Number(f64::from(value))
    }
}

/// Arbitrary parameter name -> value map, before normalization.
pub type RawParams = BTreeMap<String, RawValue>;

/// Sortable fields. The first variant is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Units sold.
    #[default]
    Popularity,
    Views,
    Rating,
    CreatedAt,
    Name,
    Price,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Popularity,
        SortField::Views,
        SortField::Rating,
        SortField::CreatedAt,
        SortField::Name,
        SortField::Price,
    ];

    /// Accepts the descriptive name or the index field name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "popularity" | "sales_total_sold" => Some(SortField::Popularity),
            "views" | "view_count" => Some(SortField::Views),
            "rating" | "review_score" => Some(SortField::Rating),
            "createdAt" | "created_at" => Some(SortField::CreatedAt),
            "name" => Some(SortField::Name),
            "price" => Some(SortField::Price),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Popularity => "popularity",
            SortField::Views => "views",
            SortField::Rating => "rating",
            SortField::CreatedAt => "createdAt",
            SortField::Name => "name",
            SortField::Price => "price",
        }
    }

    /// Search Document field the backend sorts on.
    pub fn index_field(&self) -> &'static str {
        match self {
            SortField::Popularity => fields::SALES_TOTAL_SOLD,
            SortField::Views => fields::VIEW_COUNT,
            SortField::Rating => fields::REVIEW_SCORE,
            SortField::CreatedAt => fields::CREATED_AT,
            SortField::Name => fields::NAME_KEYWORD,
            SortField::Price => fields::PRICE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Ascending),
            "desc" | "descending" => Some(SortOrder::Descending),
            _ => None,
        }
    }

    pub fn as_dsl(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Validated search request.
///
/// Built by [`crate::FilterNormalizer`]; every field is already trimmed and
/// range-checked, so the compiler never has to re-validate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free text; empty means no relevance component.
    pub text: String,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    /// Catalog-defined attribute name -> exact value (color, size, platform, ...).
    pub attribute_filters: BTreeMap<String, String>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: None,
            supplier: None,
            brand: None,
            min_price: None,
            max_price: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: 1,
            page_size: 20,
            attribute_filters: BTreeMap::new(),
        }
    }
}

impl SearchRequest {
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}
