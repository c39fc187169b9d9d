//! TimePiece Storefront library.
//!
//! The cart persistence layer of the storefront, usable from a browser
//! (`browser` feature) or natively over a file-backed storage area.
//!
//! # Modules
//!
//! - [`storage`] - Key-value storage areas and cross-document change events
//! - [`store`] - [`CartStore`], the single owner of the persisted cart
//! - [`actions`] - Typed cart actions raised by page controls
//! - [`view`] - Formatted display data for the cart page
//! - [`catalog`] - YAML product catalog
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;
pub mod view;

pub use actions::{ActionOutcome, CartAction};
pub use config::{ConfigError, StorefrontConfig};
pub use error::{Result, StoreError};
pub use store::{CartStore, DEFAULT_CART_KEY};
pub use view::{CartItemView, CartView, SummaryView};
