//! Catalog domain model.
//!
//! Products are composed of purchasable variants with open-ended attributes
//! (color, size, platform, ...). This crate is pure domain logic (no IO, no HTTP,
//! no storage); the only derived artifact it produces is the flattened
//! [`SearchDocument`] projection consumed by the search core.

pub mod category;
pub mod document;
pub mod product;
pub mod rating;
pub mod supplier;
pub mod variant;

pub use category::{Category, CategoryTree, MAX_CATEGORY_LEVEL};
pub use document::{project_product, SearchDocument, SEARCH_DOCUMENT_SCHEMA_VERSION};
pub use product::{Analytics, NewProduct, Product, SalesMetrics, Visibility};
pub use rating::Rating;
pub use supplier::{Address, Coordinates, NewSupplier, Supplier, Verification};
pub use variant::{Image, Inventory, Money, Sku, Variant, VariantSales};
