//! Catalog records read from the storefront API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A product as served by `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Image URL.
    pub image: String,
}

/// Availability as served by `GET /stock/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    /// Units available for purchase.
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be fulfilled from this record.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        check_stock(requested, self.amount)
    }
}

/// Returns `true` if `requested` units fit within `available` stock.
#[must_use]
pub const fn check_stock(requested: u32, available: u32) -> bool {
    requested <= available
}
