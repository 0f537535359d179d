//! Application state: the configured cart store and its collaborators.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::{ApiError, StorefrontApi};
use crate::config::StorefrontConfig;
use crate::notify::Notifier;
use crate::persistence::{CartMirror, FileStorage, StorageError};

/// Cart store wired to the HTTP catalog and file storage.
pub type StorefrontCart<N> = CartStore<StorefrontApi, FileStorage, N>;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storefront API client: {0}")]
    Api(#[from] ApiError),
    #[error("cart storage: {0}")]
    Storage(#[from] StorageError),
}

/// Application state shared across consumers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the single cart store.
pub struct AppState<N> {
    inner: Arc<AppStateInner<N>>,
}

struct AppStateInner<N> {
    config: StorefrontConfig,
    cart: StorefrontCart<N>,
}

impl<N> Clone for AppState<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: Notifier> AppState<N> {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `notifier` - Receives user-facing notifications from the cart
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built or the persisted
    /// cart cannot be read.
    pub fn new(config: StorefrontConfig, notifier: N) -> Result<Self, StateError> {
        let api = StorefrontApi::new(&config.api)?;
        let mirror = CartMirror::new(
            FileStorage::new(&config.storage.dir),
            config.storage.cart_key.clone(),
        );
        let cart = CartStore::open(api, mirror, notifier)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, cart }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &StorefrontCart<N> {
        &self.inner.cart
    }
}
