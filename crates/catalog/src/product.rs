use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, Entity, ProductId, SupplierId};

use crate::rating::Rating;
use crate::variant::{Money, Sku, Variant};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;
pub const MAX_BRAND_LEN: usize = 100;

/// Who can see a product. Only `Public` products are projected into the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Draft,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Analytics {
    pub view_count: u64,
    pub search_count: u64,
    pub last_viewed_at: Option<DateTime<Utc>>,
}

/// Product-level sales aggregates.
///
/// `total_sold` and `total_revenue_minor` are derived from the variants and are only
/// ever written by `Product::recompute_sales_metrics`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesMetrics {
    pub total_sold: u64,
    pub total_revenue_minor: u64,
    pub reviews: Rating,
}

/// Input for [`Product::new`].
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub supplier_id: SupplierId,
    pub brand: Option<String>,
    pub base_attributes: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

/// Catalog product: shared descriptive data plus an ordered list of variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    category_id: CategoryId,
    supplier_id: SupplierId,
    brand: Option<String>,
    base_attributes: BTreeMap<String, String>,
    tags: BTreeSet<String>,
    active: bool,
    visibility: Visibility,
    analytics: Analytics,
    sales_metrics: SalesMetrics,
    variants: Vec<Variant>,
    created_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn bounded(field: &str, value: &str, max: usize) -> DomainResult<String> {
    let value = value.trim();
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {max} characters"
        )));
    }
    Ok(value.to_string())
}

impl Product {
    pub fn new(new: NewProduct) -> DomainResult<Self> {
        let name = bounded("name", &new.name, MAX_NAME_LEN)?;
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let description = new
            .description
            .as_deref()
            .map(|d| bounded("description", d, MAX_DESCRIPTION_LEN))
            .transpose()?
            .filter(|d| !d.is_empty());
        let brand = new
            .brand
            .as_deref()
            .map(|b| bounded("brand", b, MAX_BRAND_LEN))
            .transpose()?
            .filter(|b| !b.is_empty());

        let mut base_attributes = BTreeMap::new();
        for (k, v) in new.base_attributes {
            let (k, v) = (k.trim(), v.trim());
            if k.is_empty() || v.is_empty() {
                return Err(DomainError::validation(
                    "base attribute names and values cannot be empty",
                ));
            }
            base_attributes.insert(k.to_string(), v.to_string());
        }

        let tags = new
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            id: new.id,
            name,
            description,
            category_id: new.category_id,
            supplier_id: new.supplier_id,
            brand,
            base_attributes,
            tags,
            active: true,
            visibility: new.visibility,
            analytics: Analytics::default(),
            sales_metrics: SalesMetrics::default(),
            variants: Vec::new(),
            created_at: new.created_at,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn base_attributes(&self) -> &BTreeMap<String, String> {
        &self.base_attributes
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn sales_metrics(&self) -> &SalesMetrics {
        &self.sales_metrics
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn variant(&self, sku: &Sku) -> Option<&Variant> {
        self.variants.iter().find(|v| v.sku() == sku)
    }

    pub fn active_variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|v| v.is_active())
    }

    /// Only active, public products are visible to shoppers (and to search).
    pub fn is_searchable(&self) -> bool {
        self.active && self.visibility == Visibility::Public
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    /// SKUs must be unique within the product; global uniqueness is the store's job.
    pub fn add_variant(&mut self, variant: Variant) -> DomainResult<()> {
        if self.variant(variant.sku()).is_some() {
            return Err(DomainError::conflict(format!(
                "variant {} already exists on product {}",
                variant.sku(),
                self.id
            )));
        }
        self.variants.push(variant);
        self.recompute_sales_metrics();
        Ok(())
    }

    pub fn update_variant(
        &mut self,
        sku: &Sku,
        f: impl FnOnce(&mut Variant) -> DomainResult<()>,
    ) -> DomainResult<()> {
        let variant = self
            .variants
            .iter_mut()
            .find(|v| v.sku() == sku)
            .ok_or_else(|| DomainError::not_found(format!("variant {sku}")))?;
        f(variant)?;
        self.recompute_sales_metrics();
        Ok(())
    }

    pub fn lowest_price(&self) -> Option<&Money> {
        self.active_variants()
            .map(Variant::price)
            .min_by(|a, b| a.as_major().total_cmp(&b.as_major()))
    }

    pub fn highest_price(&self) -> Option<&Money> {
        self.active_variants()
            .map(Variant::price)
            .max_by(|a, b| a.as_major().total_cmp(&b.as_major()))
    }

    /// Sum of available units across every variant.
    pub fn total_inventory(&self) -> u64 {
        self.variants.iter().map(|v| v.inventory().available()).sum()
    }

    pub fn record_sale(
        &mut self,
        sku: &Sku,
        quantity: u64,
        revenue_minor: u64,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.update_variant(sku, |v| v.record_sale(quantity, revenue_minor, at))
    }

    pub fn record_view(&mut self, at: DateTime<Utc>) {
        self.analytics.view_count += 1;
        self.analytics.last_viewed_at = Some(at);
    }

    pub fn record_search_hit(&mut self) {
        self.analytics.search_count += 1;
    }

    pub fn record_review(&mut self, score: f64) -> DomainResult<()> {
        self.sales_metrics.reviews = self.sales_metrics.reviews.record(score)?;
        Ok(())
    }

    fn recompute_sales_metrics(&mut self) {
        self.sales_metrics.total_sold = self.variants.iter().map(|v| v.sales().total_sold).sum();
        self.sales_metrics.total_revenue_minor = self
            .variants
            .iter()
            .map(|v| v.sales().total_revenue_minor)
            .sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Inventory;

    fn new_product() -> NewProduct {
        NewProduct {
            id: ProductId::new(),
            name: "  Classic V-Neck T-Shirt ".to_string(),
            description: Some("Comfortable cotton t-shirt".to_string()),
            category_id: CategoryId::new(),
            supplier_id: SupplierId::new(),
            brand: Some("ComfortWear".to_string()),
            base_attributes: BTreeMap::from([("material".to_string(), "Cotton".to_string())]),
            tags: vec![" Summer ".to_string(), "".to_string(), "BASICS".to_string()],
            visibility: Visibility::Public,
            created_at: Utc::now(),
        }
    }

    fn variant(sku: &str, price: u64, available: u64) -> Variant {
        Variant::new(Sku::parse(sku).unwrap(), Money::usd(price))
            .with_inventory(Inventory::new(available, 0).unwrap())
    }

    #[test]
    fn new_product_normalizes_name_and_tags() {
        let p = Product::new(new_product()).unwrap();
        assert_eq!(p.name(), "Classic V-Neck T-Shirt");
        assert_eq!(
            p.tags().iter().cloned().collect::<Vec<_>>(),
            vec!["basics".to_string(), "summer".to_string()]
        );
        assert!(p.is_searchable());
    }

    #[test]
    fn new_product_rejects_empty_and_oversized_fields() {
        let mut np = new_product();
        np.name = "   ".to_string();
        assert!(matches!(Product::new(np), Err(DomainError::Validation(_))));

        let mut np = new_product();
        np.brand = Some("b".repeat(MAX_BRAND_LEN + 1));
        assert!(matches!(Product::new(np), Err(DomainError::Validation(_))));

        let mut np = new_product();
        np.name = "n".repeat(MAX_NAME_LEN + 1);
        assert!(Product::new(np).is_err());
    }

    #[test]
    fn add_variant_rejects_duplicate_sku() {
        let mut p = Product::new(new_product()).unwrap();
        p.add_variant(variant("TS-RED-S", 2499, 10)).unwrap();
        let err = p.add_variant(variant("TS-RED-S", 1999, 5)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn price_bounds_ignore_inactive_variants() {
        let mut p = Product::new(new_product()).unwrap();
        p.add_variant(variant("A", 2499, 1)).unwrap();
        p.add_variant(variant("B", 1999, 1)).unwrap();
        p.add_variant(variant("C", 999, 1)).unwrap();
        p.update_variant(&Sku::parse("C").unwrap(), |v| {
            v.deactivate();
            Ok(())
        })
        .unwrap();

        assert_eq!(p.lowest_price().unwrap().amount_minor(), 1999);
        assert_eq!(p.highest_price().unwrap().amount_minor(), 2499);
        assert_eq!(p.total_inventory(), 3);
    }

    #[test]
    fn record_sale_recomputes_product_totals() {
        let mut p = Product::new(new_product()).unwrap();
        p.add_variant(variant("A", 2499, 10)).unwrap();
        p.add_variant(variant("B", 1999, 10)).unwrap();
        let now = Utc::now();
        p.record_sale(&Sku::parse("A").unwrap(), 2, 4998, now).unwrap();
        p.record_sale(&Sku::parse("B").unwrap(), 1, 1999, now).unwrap();

        assert_eq!(p.sales_metrics().total_sold, 3);
        assert_eq!(p.sales_metrics().total_revenue_minor, 6997);

        let err = p.record_sale(&Sku::parse("Z").unwrap(), 1, 1, now).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn private_or_inactive_products_are_not_searchable() {
        let mut p = Product::new(new_product()).unwrap();
        p.set_visibility(Visibility::Draft);
        assert!(!p.is_searchable());
        p.set_visibility(Visibility::Public);
        p.deactivate();
        assert!(!p.is_searchable());
    }

    #[test]
    fn reviews_and_views_accumulate() {
        let mut p = Product::new(new_product()).unwrap();
        p.record_review(4.0).unwrap();
        p.record_review(5.0).unwrap();
        p.record_view(Utc::now());
        assert_eq!(p.sales_metrics().reviews.count(), 2);
        assert_eq!(p.analytics().view_count, 1);
        assert!(p.record_review(6.0).is_err());
    }
}
