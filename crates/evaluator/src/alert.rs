use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shelflife_core::{Entity, LookaheadWindow, Product, ProductId};

/// A product found inside the lookahead window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    pub product_id: ProductId,
    pub name: String,
    pub days_remaining: i64,
}

/// Products nearing expiration on `today`, in input order.
pub fn scan(products: &[Product], today: NaiveDate, window: LookaheadWindow) -> Vec<ExpiryAlert> {
    products
        .iter()
        .filter_map(|product| {
            let days_remaining = product.days_remaining(today);
            window.contains(days_remaining).then(|| ExpiryAlert {
                product_id: product.id(),
                name: product.name().to_string(),
                days_remaining,
            })
        })
        .collect()
}
