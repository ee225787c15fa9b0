//! Sample catalog for local development and tests.
//!
//! Four categories, four suppliers and five products (t-shirts, jeans,
//! headphones, an RPG, organic apples). Identifiers are fixed so documents are
//! stable across runs.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use storefront_catalog::{
    project_product, Address, CategoryTree, Inventory, Money, NewProduct, NewSupplier, Product,
    SearchDocument, Sku, Supplier, Variant, Visibility,
};
use storefront_core::{CategoryId, DomainResult, Entity, ProductId, SupplierId};

struct VariantSpec {
    sku: &'static str,
    attributes: &'static [(&'static str, &'static str)],
    price_cents: u64,
    on_hand: u64,
    reserved: u64,
    sold: u64,
}

struct ProductSpec {
    name: &'static str,
    description: &'static str,
    category: usize,
    supplier: usize,
    brand: &'static str,
    base_attributes: &'static [(&'static str, &'static str)],
    tags: &'static [&'static str],
    rating: f64,
    views: u64,
    variants: &'static [VariantSpec],
}

const CATEGORIES: [(&str, &str); 4] = [
    ("Fashion", "Clothing and fashion accessories"),
    ("Electronics", "Electronic devices and gadgets"),
    ("Video Games", "Video games and gaming accessories"),
    ("Groceries", "Food and grocery items"),
];

const SUPPLIERS: [(&str, &str, &str); 4] = [
    ("Fashion Hub", "contact@fashionhub.com", "New York"),
    ("Tech Solutions", "sales@techsolutions.com", "San Francisco"),
    ("Game World", "info@gameworld.com", "Los Angeles"),
    ("Fresh Market", "orders@freshmarket.com", "Chicago"),
];

const PRODUCTS: [ProductSpec; 5] = [
    ProductSpec {
        name: "Classic T-Shirt",
        description: "Comfortable cotton t-shirt perfect for everyday wear",
        category: 0,
        supplier: 0,
        brand: "ComfortWear",
        base_attributes: &[("material", "Cotton"), ("season", "All Season")],
        tags: &["casual", "everyday", "cotton", "comfortable"],
        rating: 4.3,
        views: 1250,
        variants: &[
            VariantSpec {
                sku: "TSHIRT-RED-S-VNECK",
                attributes: &[("color", "Red"), ("size", "Small"), ("neckType", "V-Neck")],
                price_cents: 2599,
                on_hand: 100,
                reserved: 5,
                sold: 250,
            },
            VariantSpec {
                sku: "TSHIRT-RED-M-VNECK",
                attributes: &[("color", "Red"), ("size", "Medium"), ("neckType", "V-Neck")],
                price_cents: 2599,
                on_hand: 150,
                reserved: 10,
                sold: 380,
            },
            VariantSpec {
                sku: "TSHIRT-GREEN-M-ROUND",
                attributes: &[("color", "Green"), ("size", "Medium"), ("neckType", "Rounded-Neck")],
                price_cents: 2399,
                on_hand: 75,
                reserved: 3,
                sold: 120,
            },
            VariantSpec {
                sku: "TSHIRT-GREEN-S-VNECK",
                attributes: &[("color", "Green"), ("size", "Small"), ("neckType", "V-Neck")],
                price_cents: 2599,
                on_hand: 60,
                reserved: 2,
                sold: 95,
            },
        ],
    },
    ProductSpec {
        name: "Premium Jeans",
        description: "High-quality denim jeans with modern fit",
        category: 0,
        supplier: 0,
        brand: "DenimCraft",
        base_attributes: &[("material", "Denim"), ("fit", "Slim Fit")],
        tags: &["denim", "jeans", "premium", "slim-fit"],
        rating: 4.6,
        views: 890,
        variants: &[
            VariantSpec {
                sku: "JEANS-BLUE-30-SLIM",
                attributes: &[("color", "Blue"), ("size", "30"), ("fit", "Slim")],
                price_cents: 7999,
                on_hand: 45,
                reserved: 8,
                sold: 180,
            },
            VariantSpec {
                sku: "JEANS-BLACK-32-SLIM",
                attributes: &[("color", "Black"), ("size", "32"), ("fit", "Slim")],
                price_cents: 8499,
                on_hand: 30,
                reserved: 5,
                sold: 95,
            },
        ],
    },
    ProductSpec {
        name: "Wireless Bluetooth Headphones",
        description: "High-quality wireless headphones with noise cancellation",
        category: 1,
        supplier: 1,
        brand: "AudioTech",
        base_attributes: &[("connectivity", "Bluetooth 5.0"), ("batteryLife", "30 hours")],
        tags: &["wireless", "bluetooth", "headphones", "audio", "noise-cancellation"],
        rating: 4.7,
        views: 2150,
        variants: &[
            VariantSpec {
                sku: "HEADPHONES-BLACK-PREMIUM",
                attributes: &[("color", "Black"), ("model", "Premium")],
                price_cents: 19999,
                on_hand: 80,
                reserved: 12,
                sold: 420,
            },
            VariantSpec {
                sku: "HEADPHONES-WHITE-STANDARD",
                attributes: &[("color", "White"), ("model", "Standard")],
                price_cents: 14999,
                on_hand: 60,
                reserved: 8,
                sold: 280,
            },
        ],
    },
    ProductSpec {
        name: "Adventure Quest RPG",
        description: "Epic fantasy role-playing game with stunning graphics",
        category: 2,
        supplier: 2,
        brand: "GameStudio",
        base_attributes: &[("platform", "Multi-platform"), ("genre", "RPG")],
        tags: &["rpg", "adventure", "fantasy", "multiplayer"],
        rating: 4.8,
        views: 5600,
        variants: &[
            VariantSpec {
                sku: "GAME-RPG-PC-DIGITAL",
                attributes: &[("platform", "PC"), ("format", "Digital Download")],
                price_cents: 5999,
                on_hand: 1000,
                reserved: 50,
                sold: 1200,
            },
            VariantSpec {
                sku: "GAME-RPG-CONSOLE-PHYSICAL",
                attributes: &[("platform", "Console"), ("format", "Physical Copy")],
                price_cents: 6999,
                on_hand: 200,
                reserved: 25,
                sold: 450,
            },
        ],
    },
    ProductSpec {
        name: "Organic Apples",
        description: "Fresh organic apples from local farms",
        category: 3,
        supplier: 3,
        brand: "FreshFarms",
        base_attributes: &[("organic", "true"), ("origin", "Local Farms")],
        tags: &["organic", "fresh", "fruit", "healthy", "local"],
        rating: 4.4,
        views: 980,
        variants: &[
            VariantSpec {
                sku: "APPLES-ORGANIC-1LB",
                attributes: &[("weight", "1 lb"), ("type", "Red Delicious")],
                price_cents: 499,
                on_hand: 500,
                reserved: 20,
                sold: 850,
            },
            VariantSpec {
                sku: "APPLES-ORGANIC-3LB",
                attributes: &[("weight", "3 lb"), ("type", "Granny Smith")],
                price_cents: 1299,
                on_hand: 300,
                reserved: 15,
                sold: 320,
            },
        ],
    },
];

fn fixed_uuid(kind: u128, index: usize) -> Uuid {
    Uuid::from_u128((kind << 64) | (index as u128 + 1))
}

#[derive(Debug, Clone)]
pub struct SampleCatalog {
    pub categories: CategoryTree,
    pub suppliers: Vec<Supplier>,
    pub products: Vec<Product>,
}

impl SampleCatalog {
    /// Every Search Document the catalog projects to.
    pub fn documents(&self) -> Vec<SearchDocument> {
        self.products
            .iter()
            .flat_map(|p| {
                let category = self.categories.get(p.category_id());
                let supplier = self.suppliers.iter().find(|s| *s.id() == p.supplier_id());
                project_product(p, category, supplier)
            })
            .collect()
    }
}

pub fn sample_catalog() -> DomainResult<SampleCatalog> {
    let epoch: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();

    let mut categories = CategoryTree::new();
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (i, (name, description)) in CATEGORIES.iter().enumerate() {
        let id = CategoryId::from_uuid(fixed_uuid(1, i));
        categories.insert(id, name, Some(*description), None)?;
        category_ids.push(id);
    }

    let mut suppliers = Vec::with_capacity(SUPPLIERS.len());
    for (i, (name, email, city)) in SUPPLIERS.iter().enumerate() {
        let mut supplier = Supplier::new(NewSupplier {
            id: SupplierId::from_uuid(fixed_uuid(2, i)),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            address: Address {
                city: Some(city.to_string()),
                country: Some("USA".to_string()),
                ..Address::default()
            },
        })?;
        supplier.verify(epoch)?;
        suppliers.push(supplier);
    }

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (i, spec) in PRODUCTS.iter().enumerate() {
        let mut product = Product::new(NewProduct {
            id: ProductId::from_uuid(fixed_uuid(3, i)),
            name: spec.name.to_string(),
            description: Some(spec.description.to_string()),
            category_id: category_ids[spec.category],
            supplier_id: *suppliers[spec.supplier].id(),
            brand: Some(spec.brand.to_string()),
            base_attributes: spec
                .base_attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            tags: spec.tags.iter().map(|t| t.to_string()).collect(),
            visibility: Visibility::Public,
            created_at: epoch + chrono::Duration::days(i as i64),
        })?;

        for v in spec.variants {
            let mut variant = Variant::new(Sku::parse(v.sku)?, Money::usd(v.price_cents))
                .with_inventory(Inventory::new(v.on_hand, v.reserved)?);
            for (name, value) in v.attributes {
                variant = variant.with_attribute(name, value)?;
            }
            variant.add_image(&format!("/images/{}.jpg", v.sku.to_lowercase()), Some(spec.name), true)?;
            let sku = variant.sku().clone();
            product.add_variant(variant)?;
            product.record_sale(&sku, v.sold, v.sold * v.price_cents, epoch)?;
        }

        product.record_review(spec.rating)?;
        for _ in 0..spec.views {
            product.record_view(epoch);
        }
        products.push(product);
    }

    Ok(SampleCatalog {
        categories,
        suppliers,
        products,
    })
}
