//! HTTP client for the storefront API.
//!
//! Uses `reqwest` 0.13 for HTTP.
//! Caches product records using `moka` (TTL from configuration).

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, Catalog};
use crate::config::StorefrontApiConfig;

const PRODUCT_CACHE_CAPACITY: u64 = 1000;

// =============================================================================
// StorefrontApi
// =============================================================================

/// Client for the storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool and product cache.
#[derive(Clone)]
pub struct StorefrontApi {
    inner: Arc<StorefrontApiInner>,
}

struct StorefrontApiInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl StorefrontApi {
    /// Create a new storefront API client.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &StorefrontApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::InvalidConfig(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(StorefrontApiInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get a product by ID, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(&format!("products/{id}")).await?;
        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }

    /// Get the current stock record for a product. Never cached.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or no stock record exists.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        self.get_json(&format!("stock/{id}")).await
    }

    /// Drop a cached product record.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.products.invalidate(&id).await;
    }

    /// Issue a GET for `path` relative to the base URL and decode the body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidConfig(format!("Invalid request path {path}: {e}")))?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e)
        })
    }
}

impl Catalog for StorefrontApi {
    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_product(id).await
    }

    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        self.get_stock(id).await
    }
}
