use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ValueObject};

/// Stock keeping unit: the globally unique identity of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl TryFrom<String> for Sku {
    type Error = DomainError;

    fn try_from(raw: String) -> DomainResult<Self> {
        Self::parse(raw)
    }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self {
        sku.0
    }
}

impl Sku {
    pub fn parse(raw: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("SKU cannot be empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(format!(
                "SKU cannot contain whitespace: {trimmed:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A price: amount in the currency's smallest unit plus an ISO 4217 code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MoneyFields")]
pub struct Money {
    amount_minor: u64,
    currency: String,
}

#[derive(Deserialize)]
struct MoneyFields {
    amount_minor: u64,
    currency: String,
}

impl TryFrom<MoneyFields> for Money {
    type Error = DomainError;

    fn try_from(fields: MoneyFields) -> DomainResult<Self> {
        Self::new(fields.amount_minor, &fields.currency)
    }
}

impl ValueObject for Money {}

impl Money {
    pub fn new(amount_minor: u64, currency: &str) -> DomainResult<Self> {
        let code = currency.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "currency must be a 3-letter ISO code, got {currency:?}"
            )));
        }
        Ok(Self {
            amount_minor,
            currency: code,
        })
    }

    pub fn usd(amount_minor: u64) -> Self {
        Self {
            amount_minor,
            currency: "USD".to_string(),
        }
    }

    pub fn amount_minor(&self) -> u64 {
        self.amount_minor
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Number of decimal places between the minor and major unit.
    pub fn minor_unit_exponent(&self) -> i32 {
        match self.currency.as_str() {
            "JPY" | "KRW" | "VND" | "CLP" | "ISK" => 0,
            "BHD" | "KWD" | "OMR" | "JOD" | "TND" => 3,
            _ => 2,
        }
    }

    /// Amount in major units (e.g. 2499 USD cents -> 24.99). This is the unit the
    /// search index stores and the unit price filters are expressed in.
    pub fn as_major(&self) -> f64 {
        self.amount_minor as f64 / 10f64.powi(self.minor_unit_exponent())
    }
}

/// Stock counts for a variant.
///
/// `reserved <= on_hand` always holds, so `available()` can never go negative.
/// Every component reads availability through `available()`; nothing stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "InventoryFields")]
pub struct Inventory {
    on_hand: u64,
    reserved: u64,
}

#[derive(Deserialize)]
struct InventoryFields {
    on_hand: u64,
    reserved: u64,
}

impl TryFrom<InventoryFields> for Inventory {
    type Error = DomainError;

    fn try_from(fields: InventoryFields) -> DomainResult<Self> {
        Self::new(fields.on_hand, fields.reserved)
    }
}

impl ValueObject for Inventory {}

impl Inventory {
    pub fn new(on_hand: u64, reserved: u64) -> DomainResult<Self> {
        if reserved > on_hand {
            return Err(DomainError::invariant(format!(
                "reserved ({reserved}) cannot exceed on-hand ({on_hand})"
            )));
        }
        Ok(Self { on_hand, reserved })
    }

    pub fn on_hand(&self) -> u64 {
        self.on_hand
    }

    pub fn reserved(&self) -> u64 {
        self.reserved
    }

    pub fn available(&self) -> u64 {
        self.on_hand - self.reserved
    }

    /// Hold `quantity` units for a pending order.
    pub fn reserve(self, quantity: u64) -> DomainResult<Self> {
        if quantity > self.available() {
            return Err(DomainError::invariant(format!(
                "cannot reserve {quantity}: only {} available",
                self.available()
            )));
        }
        Ok(Self {
            reserved: self.reserved + quantity,
            ..self
        })
    }

    /// Return previously reserved units to the available pool.
    pub fn release(self, quantity: u64) -> DomainResult<Self> {
        if quantity > self.reserved {
            return Err(DomainError::invariant(format!(
                "cannot release {quantity}: only {} reserved",
                self.reserved
            )));
        }
        Ok(Self {
            reserved: self.reserved - quantity,
            ..self
        })
    }

    pub fn restock(self, quantity: u64) -> DomainResult<Self> {
        let on_hand = self
            .on_hand
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("on-hand stock overflow"))?;
        Ok(Self { on_hand, ..self })
    }

    /// Ship reserved units: they leave both the reserved and on-hand counts.
    pub fn fulfil(self, quantity: u64) -> DomainResult<Self> {
        if quantity > self.reserved {
            return Err(DomainError::invariant(format!(
                "cannot fulfil {quantity}: only {} reserved",
                self.reserved
            )));
        }
        Ok(Self {
            on_hand: self.on_hand - quantity,
            reserved: self.reserved - quantity,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt: Option<String>,
    pub is_primary: bool,
}

/// Per-variant sales counters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantSales {
    pub total_sold: u64,
    pub total_revenue_minor: u64,
    pub last_sale_at: Option<DateTime<Utc>>,
}

/// A purchasable configuration of a product.
///
/// Variants are owned by their [`crate::Product`] and have no lifecycle of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    sku: Sku,
    attributes: BTreeMap<String, String>,
    price: Money,
    inventory: Inventory,
    images: Vec<Image>,
    active: bool,
    sales: VariantSales,
}

impl Variant {
    pub fn new(sku: Sku, price: Money) -> Self {
        Self {
            sku,
            attributes: BTreeMap::new(),
            price,
            inventory: Inventory::default(),
            images: Vec::new(),
            active: true,
            sales: VariantSales::default(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> DomainResult<Self> {
        self.set_attribute(name, value)?;
        Ok(self)
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn inventory(&self) -> Inventory {
        self.inventory
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn primary_image(&self) -> Option<&Image> {
        self.images.iter().find(|img| img.is_primary)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sales(&self) -> &VariantSales {
        &self.sales
    }

    /// Attribute names and values are trimmed; neither may be empty.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> DomainResult<()> {
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            return Err(DomainError::validation("attribute name cannot be empty"));
        }
        if value.is_empty() {
            return Err(DomainError::validation(format!(
                "attribute {name:?} cannot have an empty value"
            )));
        }
        self.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_price(&mut self, price: Money) {
        self.price = price;
    }

    pub fn set_inventory(&mut self, inventory: Inventory) {
        self.inventory = inventory;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Append an image. Marking it primary demotes any existing primary image.
    pub fn add_image(&mut self, url: &str, alt: Option<&str>, primary: bool) -> DomainResult<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DomainError::validation("image url cannot be empty"));
        }
        if primary {
            self.images.iter_mut().for_each(|img| img.is_primary = false);
        }
        self.images.push(Image {
            url: url.to_string(),
            alt: alt.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
            is_primary: primary,
        });
        Ok(())
    }

    pub fn set_primary_image(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.images.len() {
            return Err(DomainError::not_found(format!("image #{index}")));
        }
        for (i, img) in self.images.iter_mut().enumerate() {
            img.is_primary = i == index;
        }
        Ok(())
    }

    pub fn record_sale(
        &mut self,
        quantity: u64,
        revenue_minor: u64,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation("sale quantity must be positive"));
        }
        self.sales.total_sold += quantity;
        self.sales.total_revenue_minor += revenue_minor;
        self.sales.last_sale_at = Some(at);
        Ok(())
    }
}
