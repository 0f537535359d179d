//! Storefront API access: product records and stock levels.
//!
//! # Architecture
//!
//! - [`Catalog`] is the seam the cart store reads through
//! - [`StorefrontApi`] implements it over HTTP with `reqwest`
//! - Product records are cached in memory via `moka`; stock levels never are,
//!   since they gate every quantity change
//!
//! # Endpoints
//!
//! - `GET {base}/products/{id}` - product display fields
//! - `GET {base}/stock/{id}` - available units

mod client;

pub use client::StorefrontApi;

use std::future::Future;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when reading from the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Client could not be configured.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Read access to product and stock records.
///
/// Implemented by [`StorefrontApi`]; tests substitute in-memory catalogs.
pub trait Catalog: Send + Sync {
    /// Fetch the product record for `id`.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// Fetch the stock record for `id`.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - maintenance");

        let err = ApiError::NotFound("products/7".to_string());
        assert_eq!(err.to_string(), "Not found: products/7");

        let err = ApiError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }
}
