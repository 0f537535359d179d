//! The cart store.
//!
//! [`CartStore`] owns the cart, validates quantity changes against stock, and
//! mirrors every successful change into storage before publishing it.
//!
//! # Consistency
//!
//! Each mutation is a transaction on one product ID: a per-product lock is
//! held from the first catalog read until the commit, so two requests for the
//! same product never validate against the same stale quantity. The commit
//! itself (read current cart, apply, persist, replace) runs under the state
//! lock without suspending, so concurrent changes to different products are
//! all kept.

use std::sync::{PoisonError, RwLock};

use rocketshoes_core::{Cart, CartEntry, Product, ProductId, Quantity, QuantityError};
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::error::{CartError, CartOperation, add_breadcrumb, capture_error};
use crate::locks::KeyedLocks;
use crate::notify::{Notification, Notifier};
use crate::persistence::{CartMirror, Storage, StorageError};
use crate::stock::{StockCheck, validate_stock};

/// Request to set a product's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Desired quantity. Values below 1 are rejected.
    pub amount: i64,
}

/// Starting point for a line change.
enum Draft {
    /// The product is already in the cart.
    Existing(CartEntry),
    /// The product is new to the cart; it starts from zero units.
    New(Product),
}

impl Draft {
    /// Quantity after adding one unit, or `None` on overflow.
    fn next_amount(&self) -> Option<Quantity> {
        match self {
            Self::Existing(entry) => entry.amount.incremented(),
            Self::New(_) => Some(Quantity::ONE),
        }
    }

    fn into_entry(self, amount: Quantity) -> CartEntry {
        match self {
            Self::Existing(entry) => entry.with_amount(amount),
            Self::New(product) => CartEntry::from_product(product, amount),
        }
    }
}

/// Shopping cart state container.
///
/// Construct one per session with [`CartStore::open`] and share it by
/// reference (or `Arc`). Every mutation returns the resulting cart.
pub struct CartStore<C, S, N> {
    catalog: C,
    mirror: CartMirror<S>,
    notifier: N,
    cart: RwLock<Cart>,
    locks: KeyedLocks<ProductId>,
}

impl<C: Catalog, S: Storage, N: Notifier> CartStore<C, S, N> {
    /// Rehydrate the cart from `mirror` and build the store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` if the persisted cart cannot be parsed,
    /// or `StorageError::Io` if it cannot be read.
    pub fn open(catalog: C, mirror: CartMirror<S>, notifier: N) -> Result<Self, StorageError> {
        let cart = mirror.load()?;
        info!(
            key = %mirror.key(),
            lines = cart.len(),
            "Cart rehydrated"
        );

        Ok(Self {
            catalog,
            mirror,
            notifier,
            cart: RwLock::new(cart),
            locks: KeyedLocks::new(),
        })
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn mirror(&self) -> &CartMirror<S> {
        &self.mirror
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Add one unit of `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfStock` if one more unit exceeds stock, or the
    /// catalog/storage error that aborted the change. The cart is unchanged
    /// on error and the user is notified.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let result = self.try_add_product(product_id).await;
        self.finish(CartOperation::Add, product_id, result)
    }

    /// Remove `product_id` from the cart. Removing an absent product succeeds
    /// and leaves the cart as it was.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be persisted. The cart
    /// is unchanged on error and the user is notified.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let result = self.try_remove_product(product_id).await;
        self.finish(CartOperation::Remove, product_id, result)
    }

    /// Set the quantity of a product, adding it if absent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidAmount` for quantities below 1,
    /// `CartError::OutOfStock` if the quantity exceeds stock, or the
    /// catalog/storage error that aborted the change. The cart is unchanged
    /// on error and the user is notified.
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<Cart, CartError> {
        let result = self.try_update_product_amount(update).await;
        self.finish(CartOperation::UpdateAmount, update.product_id, result)
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let _guard = self.locks.acquire(&product_id).await;

        let draft = self.draft(product_id).await?;
        let amount = draft.next_amount().ok_or(CartError::InvalidAmount {
            product_id,
            source: QuantityError::TooLarge {
                max: u32::MAX,
                got: i64::from(u32::MAX) + 1,
            },
        })?;

        self.ensure_in_stock(product_id, amount).await?;
        self.commit(|cart| {
            cart.upsert(draft.into_entry(amount));
        })
    }

    async fn try_remove_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let _guard = self.locks.acquire(&product_id).await;

        self.commit(|cart| {
            if cart.remove(product_id).is_none() {
                debug!("Product not in cart");
            }
        })
    }

    async fn try_update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<Cart, CartError> {
        let product_id = update.product_id;
        let amount = Quantity::try_from(update.amount)
            .map_err(|source| CartError::InvalidAmount { product_id, source })?;

        let _guard = self.locks.acquire(&product_id).await;

        let draft = self.draft(product_id).await?;
        self.ensure_in_stock(product_id, amount).await?;
        self.commit(|cart| {
            cart.upsert(draft.into_entry(amount));
        })
    }

    /// The current line for `product_id`, or the catalog product to start one.
    async fn draft(&self, product_id: ProductId) -> Result<Draft, CartError> {
        let existing = self
            .cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(product_id)
            .cloned();

        match existing {
            Some(entry) => Ok(Draft::Existing(entry)),
            None => Ok(Draft::New(self.catalog.product(product_id).await?)),
        }
    }

    async fn ensure_in_stock(
        &self,
        product_id: ProductId,
        amount: Quantity,
    ) -> Result<(), CartError> {
        match validate_stock(&self.catalog, product_id, amount.get()).await? {
            StockCheck::Available => Ok(()),
            StockCheck::Insufficient {
                requested,
                available,
            } => Err(CartError::OutOfStock {
                product_id,
                requested,
                available,
            }),
        }
    }

    /// Apply `change` to the current cart, persist the result, then publish it.
    ///
    /// If persisting fails the in-memory cart is left untouched.
    fn commit(&self, change: impl FnOnce(&mut Cart)) -> Result<Cart, CartError> {
        let mut current = self.cart.write().unwrap_or_else(PoisonError::into_inner);

        let mut next = current.clone();
        change(&mut next);
        self.mirror.save(&next)?;

        current.clone_from(&next);
        Ok(next)
    }

    /// Log, report, and notify according to the outcome of `operation`.
    fn finish(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        result: Result<Cart, CartError>,
    ) -> Result<Cart, CartError> {
        match &result {
            Ok(cart) => {
                debug!(
                    lines = cart.len(),
                    amount = cart.amount_of(product_id),
                    "Cart updated"
                );
                add_breadcrumb(
                    "cart",
                    operation.breadcrumb(),
                    Some(&[("product_id", &product_id.to_string())]),
                );
            }
            Err(err) => {
                if err.is_reportable() {
                    capture_error(err, operation);
                } else {
                    warn!(error = %err, "Cart operation rejected");
                }
                self.notifier.notify(Notification {
                    level: err.level(),
                    message: err.user_message(operation).to_string(),
                });
            }
        }

        result
    }
}
