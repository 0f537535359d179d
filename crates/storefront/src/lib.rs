//! RocketShoes Storefront library.
//!
//! Client-side cart state for the storefront: add, remove, and re-quantify
//! products, validate quantities against the stock endpoint, and keep the
//! cart persisted across restarts.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_storefront::{AppState, StorefrontConfig, TracingNotifier};
//!
//! let config = StorefrontConfig::from_env()?;
//! let state = AppState::new(config, TracingNotifier)?;
//!
//! let cart = state.cart().add_product(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
mod locks;
pub mod notify;
pub mod persistence;
pub mod state;
pub mod stock;

#[cfg(test)]
mod test_support;

pub use cart::{CartStore, UpdateProductAmount};
pub use catalog::{ApiError, Catalog, StorefrontApi};
pub use config::{ConfigError, StorefrontConfig};
pub use error::{CartError, CartOperation};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use persistence::{CartMirror, FileStorage, MemoryStorage, Storage, StorageError};
pub use state::{AppState, StateError};
pub use stock::{StockCheck, validate_stock};
