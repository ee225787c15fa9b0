//! Search Document projection.
//!
//! The document store keeps variant attributes as a nested map; the search index
//! needs every attribute addressable as its own field. This module is the single
//! place where that flattening happens, and the field names in [`fields`] are the
//! contract between the catalog and the search core.
//!
//! Schema version 1:
//!
//! | field | source |
//! |---|---|
//! | `sku` | variant SKU (document identity) |
//! | `product_id`, `name`, `description`, `brand`, `tags`, `created_at` | product |
//! | `category_id`, `category_name` | product category |
//! | `supplier_id`, `supplier_name` | product supplier |
//! | `attributes.<name>` | product base attributes, overridden by variant attributes |
//! | `price`, `currency` | variant price in major units |
//! | `inventory_available` | variant `Inventory::available()` |
//! | `sales_total_sold`, `view_count`, `review_score` | product aggregates |
//!
//! An attribute that is not projected here cannot be filtered on. Bump
//! [`SEARCH_DOCUMENT_SCHEMA_VERSION`] whenever a field is added, renamed or removed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use storefront_core::Entity;

use crate::category::Category;
use crate::product::Product;
use crate::supplier::Supplier;

pub const SEARCH_DOCUMENT_SCHEMA_VERSION: u32 = 1;

/// Index field names.
pub mod fields {
    pub const SKU: &str = "sku";
    pub const PRODUCT_ID: &str = "product_id";
    pub const NAME: &str = "name";
    /// Unanalyzed form of `name` (sorting).
    pub const NAME_KEYWORD: &str = "name.keyword";
    pub const DESCRIPTION: &str = "description";
    pub const BRAND: &str = "brand";
    /// Unanalyzed form of `brand` (exact filtering).
    pub const BRAND_KEYWORD: &str = "brand.keyword";
    pub const CATEGORY_ID: &str = "category_id";
    pub const CATEGORY_NAME: &str = "category_name";
    pub const SUPPLIER_ID: &str = "supplier_id";
    pub const SUPPLIER_NAME: &str = "supplier_name";
    pub const PRICE: &str = "price";
    pub const CURRENCY: &str = "currency";
    pub const INVENTORY_AVAILABLE: &str = "inventory_available";
    pub const SALES_TOTAL_SOLD: &str = "sales_total_sold";
    pub const VIEW_COUNT: &str = "view_count";
    pub const REVIEW_SCORE: &str = "review_score";
    pub const CREATED_AT: &str = "created_at";
    pub const TAGS: &str = "tags";

    pub const ATTRIBUTE_PREFIX: &str = "attributes.";

    /// `color` -> `attributes.color`.
    pub fn attribute_field(name: &str) -> String {
        format!("{ATTRIBUTE_PREFIX}{name}")
    }

    /// `attributes.color` -> `color`.
    pub fn attribute_name(field: &str) -> Option<&str> {
        field.strip_prefix(ATTRIBUTE_PREFIX).filter(|n| !n.is_empty())
    }
}

/// Flattened, read-only projection of one variant.
///
/// On the wire each attribute is a top-level `attributes.<name>` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireDocument", try_from = "WireDocument")]
pub struct SearchDocument {
    pub sku: String,
    pub product_id: String,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category_id: String,
    pub category_name: Option<String>,
    pub supplier_id: String,
    pub supplier_name: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub price: f64,
    pub currency: String,
    pub inventory_available: u64,
    pub sales_total_sold: u64,
    pub view_count: u64,
    pub review_score: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl SearchDocument {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One document per active variant of a searchable product; empty otherwise.
pub fn project_product(
    product: &Product,
    category: Option<&Category>,
    supplier: Option<&Supplier>,
) -> Vec<SearchDocument> {
    if !product.is_searchable() {
        return Vec::new();
    }

    product
        .active_variants()
        .map(|variant| {
            let mut attributes = product.base_attributes().clone();
            attributes.extend(
                variant
                    .attributes()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );

            SearchDocument {
                sku: variant.sku().to_string(),
                product_id: product.id().to_string(),
                name: product.name().to_string(),
                description: product.description().map(str::to_string),
                brand: product.brand().map(str::to_string),
                category_id: product.category_id().to_string(),
                category_name: category.map(|c| c.name().to_string()),
                supplier_id: product.supplier_id().to_string(),
                supplier_name: supplier.map(|s| s.name().to_string()),
                attributes,
                price: variant.price().as_major(),
                currency: variant.price().currency().to_string(),
                inventory_available: variant.inventory().available(),
                sales_total_sold: product.sales_metrics().total_sold,
                view_count: product.analytics().view_count,
                review_score: product.sales_metrics().reviews.average(),
                created_at: Some(product.created_at()),
                tags: product.tags().iter().cloned().collect(),
            }
        })
        .collect()
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Accepts `4.5` or `"4.5"`; some indexers write numbers as strings.
fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    match JsonValue::deserialize(de)? {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        JsonValue::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        JsonValue::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!("expected number, got {other}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireDocument {
    sku: String,
    product_id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
    category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_name: Option<String>,
    supplier_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplier_name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    price: f64,
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default)]
    inventory_available: u64,
    #[serde(default)]
    sales_total_sold: u64,
    #[serde(default)]
    view_count: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    review_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(flatten)]
    rest: BTreeMap<String, JsonValue>,
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<SearchDocument> for WireDocument {
    fn from(doc: SearchDocument) -> Self {
        let rest = doc
            .attributes
            .into_iter()
            .map(|(k, v)| (fields::attribute_field(&k), JsonValue::String(v)))
            .collect();

        Self {
            sku: doc.sku,
            product_id: doc.product_id,
            name: doc.name,
            description: doc.description,
            brand: doc.brand,
            category_id: doc.category_id,
            category_name: doc.category_name,
            supplier_id: doc.supplier_id,
            supplier_name: doc.supplier_name,
            price: doc.price,
            currency: doc.currency,
            inventory_available: doc.inventory_available,
            sales_total_sold: doc.sales_total_sold,
            view_count: doc.view_count,
            review_score: doc.review_score,
            created_at: doc.created_at,
            tags: doc.tags,
            rest,
        }
    }
}

impl TryFrom<WireDocument> for SearchDocument {
    type Error = String;

    fn try_from(wire: WireDocument) -> Result<Self, Self::Error> {
        if wire.sku.trim().is_empty() {
            return Err("search document has an empty sku".to_string());
        }

        let mut attributes = BTreeMap::new();
        // Nested form (`"attributes": {"color": "Red"}`) first, so flattened keys win.
        if let Some(JsonValue::Object(nested)) = wire.rest.get("attributes") {
            for (k, v) in nested {
                if let Some(v) = scalar_to_string(v) {
                    attributes.insert(k.clone(), v);
                }
            }
        }
        for (key, value) in &wire.rest {
            if let (Some(name), Some(v)) = (fields::attribute_name(key), scalar_to_string(value)) {
                attributes.insert(name.to_string(), v);
            }
        }

        Ok(Self {
            sku: wire.sku,
            product_id: wire.product_id,
            name: wire.name,
            description: wire.description,
            brand: wire.brand,
            category_id: wire.category_id,
            category_name: wire.category_name,
            supplier_id: wire.supplier_id,
            supplier_name: wire.supplier_name,
            attributes,
            price: wire.price,
            currency: wire.currency,
            inventory_available: wire.inventory_available,
            sales_total_sold: wire.sales_total_sold,
            view_count: wire.view_count,
            review_score: wire.review_score,
            created_at: wire.created_at,
            tags: wire.tags,
        })
    }
}
