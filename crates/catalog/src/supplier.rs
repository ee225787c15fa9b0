use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, SupplierId, ValueObject};

use crate::rating::Rating;

pub const MAX_SUPPLIER_NAME_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl ValueObject for Address {}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verification {
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub id: SupplierId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Address,
}

/// A supplier of catalog products.
///
/// Email uniqueness across suppliers is enforced by the owning store, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    email: String,
    phone: Option<String>,
    address: Address,
    active: bool,
    verification: Verification,
    rating: Rating,
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::validation(format!("invalid email address: {raw:?}")));
    }
    Ok(email)
}

impl Supplier {
    pub fn new(new: NewSupplier) -> DomainResult<Self> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("supplier name cannot be empty"));
        }
        if name.chars().count() > MAX_SUPPLIER_NAME_LEN {
            return Err(DomainError::validation(format!(
                "supplier name cannot exceed {MAX_SUPPLIER_NAME_LEN} characters"
            )));
        }
        Ok(Self {
            id: new.id,
            name: name.to_string(),
            email: normalize_email(&new.email)?,
            phone: new.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            address: new.address,
            active: true,
            verification: Verification::default(),
            rating: Rating::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn verification(&self) -> &Verification {
        &self.verification
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn change_email(&mut self, email: &str) -> DomainResult<()> {
        self.email = normalize_email(email)?;
        Ok(())
    }

    pub fn verify(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.verification.is_verified {
            return Err(DomainError::conflict("supplier is already verified"));
        }
        self.verification = Verification {
            is_verified: true,
            verified_at: Some(at),
        };
        Ok(())
    }

    pub fn record_rating(&mut self, score: f64) -> DomainResult<()> {
        self.rating = self.rating.record(score)?;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_supplier(email: &str) -> NewSupplier {
        NewSupplier {
            id: SupplierId::new(),
            name: " Fashion Basics Co ".to_string(),
            email: email.to_string(),
            phone: Some("  ".to_string()),
            address: Address {
                city: Some("Cairo".to_string()),
                coordinates: Some(Coordinates {
                    latitude: 30.04,
                    longitude: 31.23,
                }),
                ..Address::default()
            },
        }
    }

    #[test]
    fn email_is_normalized() {
        let s = Supplier::new(new_supplier("  Sales@Basics.COM ")).unwrap();
        assert_eq!(s.email(), "sales@basics.com");
        assert_eq!(s.name(), "Fashion Basics Co");
        assert_eq!(s.phone(), None);
    }

    #[test]
    fn invalid_emails_are_rejected() {
        for bad in ["", "no-at-sign", "@basics.com", "a@nodot", "a b@x.com", "a@.com"] {
            assert!(Supplier::new(new_supplier(bad)).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn verify_is_one_shot() {
        let mut s = Supplier::new(new_supplier("a@b.co")).unwrap();
        let now = Utc::now();
        s.verify(now).unwrap();
        assert!(s.verification().is_verified);
        assert_eq!(s.verification().verified_at, Some(now));
        assert!(matches!(s.verify(now), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn ratings_stay_in_range() {
        let mut s = Supplier::new(new_supplier("a@b.co")).unwrap();
        s.record_rating(5.0).unwrap();
        s.record_rating(3.0).unwrap();
        assert_eq!(s.rating().count(), 2);
        assert!((s.rating().average() - 4.0).abs() < 1e-9);
        assert!(s.record_rating(7.0).is_err());
        assert_eq!(s.rating().count(), 2);
    }
}
