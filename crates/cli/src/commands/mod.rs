//! Subcommand implementations.

pub mod cart;
pub mod products;

use timepiece_core::Catalog;
use timepiece_storefront::StorefrontConfig;
use timepiece_storefront::catalog::load_catalog;

/// Load the configured catalog.
///
/// # Errors
///
/// Returns an error if no catalog is configured or it cannot be loaded.
pub fn catalog(config: &StorefrontConfig) -> Result<Catalog, Box<dyn std::error::Error>> {
    let path = config
        .catalog_path
        .as_deref()
        .ok_or("TIMEPIECE_CATALOG_PATH not set (or pass --catalog)")?;
    Ok(load_catalog(path)?)
}
