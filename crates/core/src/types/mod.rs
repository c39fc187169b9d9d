//! Core types for TimePiece.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::{ProductId, ProductIdError};
pub use price::{CurrencyCode, Price, PriceValue, normalize_price};
pub use quantity::{Quantity, QuantityError, parse_quantity};
