//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types shared by every RocketShoes component:
//! - `storefront` - Cart store, stock validation, and persistence
//! - `cli` - Terminal client for inspecting and editing the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. Anything here can be unit tested without
//! a runtime.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, quantities, catalog records, and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
