//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;

pub use cart::{Cart, CartEntry};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::{Product, Stock, check_stock};
pub use quantity::{Quantity, QuantityError};
