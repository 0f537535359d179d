//! In-memory doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rocketshoes_core::{Product, ProductId, Stock};
use rust_decimal::Decimal;

use crate::catalog::{ApiError, Catalog};
use crate::persistence::{MemoryStorage, Storage, StorageError};

/// Catalog serving fixed products and adjustable stock.
#[derive(Default)]
pub struct FakeCatalog {
    products: HashMap<ProductId, Product>,
    stock: Mutex<HashMap<ProductId, u32>>,
    product_reads: AtomicUsize,
    stock_reads: AtomicUsize,
    fail_stock: AtomicBool,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register product `id` with `available` units.
    pub fn with_product(mut self, id: i32, available: u32) -> Self {
        let product_id = ProductId::new(id);
        self.products.insert(
            product_id,
            Product {
                id: product_id,
                title: format!("Tênis {id}"),
                price: Decimal::new(1799, 1),
                image: format!("https://cdn.example.com/{id}.jpg"),
            },
        );
        self.stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product_id, available);
        self
    }

    pub fn fail_stock_reads(&self, fail: bool) {
        self.fail_stock.store(fail, Ordering::SeqCst);
    }

    pub fn product_reads(&self) -> usize {
        self.product_reads.load(Ordering::SeqCst)
    }

    pub fn stock_reads(&self) -> usize {
        self.stock_reads.load(Ordering::SeqCst)
    }
}

impl Catalog for FakeCatalog {
    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.product_reads.fetch_add(1, Ordering::SeqCst);
        // Give other tasks a chance to interleave, as a network read would.
        tokio::task::yield_now().await;

        self.products
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("products/{id}")))
    }

    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        self.stock_reads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.fail_stock.load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 503,
                message: "stock service unavailable".to_string(),
            });
        }

        let available = self
            .stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied();

        available
            .map(|amount| Stock { id, amount })
            .ok_or_else(|| ApiError::NotFound(format!("stock/{id}")))
    }
}

/// Memory storage whose writes can be made to fail.
#[derive(Clone, Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    fail_writes: Arc<AtomicBool>,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(())
    }
}

impl Storage for FailingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.remove_item(key)
    }
}
