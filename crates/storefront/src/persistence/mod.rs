//! Durable cart persistence.
//!
//! # Architecture
//!
//! - [`Storage`] is a string-keyed slot store in the shape of browser local
//!   storage: whole values in, whole values out
//! - [`FileStorage`] keeps one file per key; [`MemoryStorage`] keeps a map
//! - [`CartMirror`] serializes the whole cart into a single slot after every
//!   change and reads it back once at startup

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

use rocketshoes_core::Cart;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when reading or writing storage slots.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the slot failed.
    #[error("I/O error on slot {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The slot holds content that is not a valid cart.
    #[error("Corrupt data in slot {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String-keyed durable slots.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the slot exists but cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the slot cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the slot. Deleting a missing slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the slot exists but cannot be deleted.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Mirrors the cart into one storage slot.
#[derive(Debug, Clone)]
pub struct CartMirror<S> {
    storage: S,
    key: String,
}

impl<S: Storage> CartMirror<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Storage key of the cart slot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the persisted cart. An absent slot is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` if the slot does not hold a valid cart,
    /// or `StorageError::Io` if it cannot be read.
    pub fn load(&self) -> Result<Cart, StorageError> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            debug!(key = %self.key, "No persisted cart, starting empty");
            return Ok(Cart::new());
        };

        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: self.key.clone(),
            source,
        })
    }

    /// Overwrite the slot with `cart`.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart)?;
        self.storage.set_item(&self.key, &raw)
    }
}
