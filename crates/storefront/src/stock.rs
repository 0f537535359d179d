//! Stock validation against the remote inventory.
//!
//! Validation only reports; deciding whether and how to tell the user is up
//! to the caller.

use rocketshoes_core::ProductId;
use tracing::instrument;

use crate::catalog::{ApiError, Catalog};

/// Outcome of a stock check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockCheck {
    /// The requested units are available.
    Available,
    /// Fewer units are available than requested.
    Insufficient { requested: u32, available: u32 },
}

/// Read the stock record for `product_id` and compare it to `requested`.
///
/// # Errors
///
/// Propagates any failure reading the stock record.
#[instrument(skip(catalog))]
pub async fn validate_stock<C: Catalog>(
    catalog: &C,
    product_id: ProductId,
    requested: u32,
) -> Result<StockCheck, ApiError> {
    let stock = catalog.stock(product_id).await?;

    if stock.covers(requested) {
        Ok(StockCheck::Available)
    } else {
        Ok(StockCheck::Insufficient {
            requested,
            available: stock.amount,
        })
    }
}
