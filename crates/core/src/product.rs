use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::ProductId;

/// A tracked perishable item.
///
/// The `id` is always assigned by a record store; callers that want to
/// persist something build a [`NewProduct`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    expiration_date: NaiveDate,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, expiration_date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            expiration_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expiration_date(&self) -> NaiveDate {
        self.expiration_date
    }

    /// Whole calendar days from `today` until this product expires.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        days_remaining(self.expiration_date, today)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// A product that has not been persisted yet (no id assigned).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub expiration_date: NaiveDate,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, expiration_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            expiration_date,
        }
    }

    /// Attach the store-assigned identifier.
    pub fn with_id(self, id: ProductId) -> Product {
        Product::new(id, self.name, self.expiration_date)
    }
}

/// Signed number of calendar days from `today` to `expiration`.
///
/// Negative once the product has expired; zero on the expiration day itself.
pub fn days_remaining(expiration: NaiveDate, today: NaiveDate) -> i64 {
    expiration.signed_duration_since(today).num_days()
}
