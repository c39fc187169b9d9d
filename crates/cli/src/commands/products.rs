//! Catalog listing.
//!
//! # Usage
//!
//! ```bash
//! tp-cli products
//! tp-cli products --category sport
//! ```

use tracing::{info, warn};

use timepiece_core::{CategoryFilter, Price};
use timepiece_storefront::StorefrontConfig;

/// List catalog products passing the category filter.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub fn list(config: &StorefrontConfig, category: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = super::catalog(config)?;
    let filter: CategoryFilter = category.parse().unwrap_or_default();

    let mut shown = 0_usize;
    for product in catalog.filter(&filter) {
        let price = Price::new(product.price.amount(), config.currency);
        match product.category.as_deref() {
            Some(category) => info!("{}  {}  {price}  [{category}]", product.id, product.name),
            None => info!("{}  {}  {price}", product.id, product.name),
        }
        shown += 1;
    }

    if shown == 0 {
        warn!(category, "No products found");
        let categories = catalog.categories();
        if !categories.is_empty() {
            info!("Categories: {}", categories.join(", "));
        }
    }
    Ok(())
}
