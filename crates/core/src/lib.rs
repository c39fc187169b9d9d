//! TimePiece Core - Cart, product and pricing types.
//!
//! This crate provides the domain types shared by the TimePiece components:
//! - `storefront` - Cart store, storage areas, view models and cart actions
//! - `cli` - Command-line driver over a file-backed storage area
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! storage access, no logging. Persistence lives in the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, quantities and prices
//! - [`cart`] - Line items and the cart list with its lenient JSON loader
//! - [`product`] - Products, listing conversion and the category catalog
//! - [`pricing`] - Shipping policy, tax and the order summary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pricing;
pub mod product;
pub mod types;

pub use cart::{Cart, CartLoad, CartParseError, LineItem, LoadIssue};
pub use pricing::{OrderSummary, PricingRules, ShippingPolicy};
pub use product::{Catalog, CategoryFilter, Product, ProductListing};
pub use types::*;
