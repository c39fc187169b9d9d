//! Integration tests for the TimePiece storefront cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p timepiece-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart operations through the store, end to end
//! - `cross_tab` - Several documents sharing one storage area
//! - `file_storage` - Carts persisted between processes
//! - `checkout` - Actions, views and checkout

use timepiece_core::{PriceValue, Product, ProductId};

/// A product with the given id, name and displayed price.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product(id: &str, name: &str, price: &str) -> Product {
    Product::new(
        ProductId::parse(id).expect("test product id"),
        name,
        PriceValue::from(price),
    )
}

/// Parse a product id.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::expect_used)]
pub fn id(id: &str) -> ProductId {
    ProductId::parse(id).expect("test product id")
}
