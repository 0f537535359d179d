//! Cart errors with Sentry integration.
//!
//! Provides a unified `CartError` type for every cart operation, the mapping
//! from errors to user-facing messages, and helpers that report to Sentry.
//! Sentry calls are no-ops until a client is initialized.

use rocketshoes_core::{ProductId, QuantityError};
use thiserror::Error;

use crate::catalog::ApiError;
use crate::notify::NotificationLevel;
use crate::persistence::StorageError;

/// Shown when the requested quantity exceeds available stock.
pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// The cart operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    /// Generic message shown when the operation fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Error adding product",
            Self::Remove => "Error removing product",
            Self::UpdateAmount => "Error updating product quantity",
        }
    }

    /// Breadcrumb message recorded when the operation succeeds.
    #[must_use]
    pub const fn breadcrumb(self) -> &'static str {
        match self {
            Self::Add => "Added product to cart",
            Self::Remove => "Removed product from cart",
            Self::UpdateAmount => "Updated product quantity",
        }
    }
}

/// Error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Not enough stock for the requested quantity.
    #[error("Out of stock: product {product_id} requested {requested}, {available} available")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The requested quantity is not a valid cart quantity.
    #[error("Invalid amount for product {product_id}: {source}")]
    InvalidAmount {
        product_id: ProductId,
        #[source]
        source: QuantityError,
    },

    /// Storefront API read failed.
    #[error("Catalog error: {0}")]
    Api(#[from] ApiError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Message to show the user for a failure of `operation`.
    ///
    /// Only stock shortfalls are explained; everything else gets the
    /// operation's generic failure message.
    #[must_use]
    pub const fn user_message(&self, operation: CartOperation) -> &'static str {
        match self {
            Self::OutOfStock { .. } => OUT_OF_STOCK_MESSAGE,
            _ => operation.failure_message(),
        }
    }

    /// Severity of the notification for this error.
    #[must_use]
    pub const fn level(&self) -> NotificationLevel {
        match self {
            Self::OutOfStock { .. } => NotificationLevel::Warning,
            _ => NotificationLevel::Error,
        }
    }

    /// Whether this is an infrastructure failure worth capturing to Sentry,
    /// as opposed to a rejected request.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Storage(_))
    }
}

/// Capture an error to Sentry and log it with the event ID.
pub fn capture_error(err: &CartError, operation: CartOperation) {
    let event_id = sentry::capture_error(err);
    tracing::error!(
        error = %err,
        operation = ?operation,
        sentry_event_id = %event_id,
        "Cart operation failed"
    );
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::OutOfStock {
            product_id: ProductId::new(3),
            requested: 6,
            available: 5,
        };
        assert_eq!(
            err.to_string(),
            "Out of stock: product 3 requested 6, 5 available"
        );

        let err = CartError::InvalidAmount {
            product_id: ProductId::new(3),
            source: QuantityError::NotPositive(0),
        };
        assert_eq!(
            err.to_string(),
            "Invalid amount for product 3: quantity must be at least 1 (got 0)"
        );
    }

    #[test]
    fn test_user_messages() {
        let out_of_stock = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        let api = CartError::Api(ApiError::RateLimited(5));

        assert_eq!(
            out_of_stock.user_message(CartOperation::UpdateAmount),
            OUT_OF_STOCK_MESSAGE
        );
        assert_eq!(api.user_message(CartOperation::Add), "Error adding product");
        assert_eq!(
            api.user_message(CartOperation::UpdateAmount),
            "Error updating product quantity"
        );
        // Internal details never leak into the toast
        assert!(!api.user_message(CartOperation::Add).contains("Rate limited"));
    }

    #[test]
    fn test_levels_and_reporting() {
        let out_of_stock = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        let invalid = CartError::InvalidAmount {
            product_id: ProductId::new(1),
            source: QuantityError::NotPositive(-1),
        };
        let api = CartError::Api(ApiError::NotFound("products/1".to_string()));

        assert_eq!(out_of_stock.level(), NotificationLevel::Warning);
        assert_eq!(invalid.level(), NotificationLevel::Error);
        assert!(!out_of_stock.is_reportable());
        assert!(!invalid.is_reportable());
        assert!(api.is_reportable());
    }
}
