//! Product catalog loaded from a YAML file.
//!
//! Entries are read like the product cards of a listing page: `id` is
//! optional and derived from the name when missing, and `price` may be a
//! number or a display string such as `"$1,299.00"`.
//!
//! ```yaml
//! products:
//!   - name: Classic Gold Watch
//!     price: "$249.99"
//!     category: luxury
//!   - id: sport-chrono
//!     name: Sport Chronograph
//!     price: 179
//!     category: sport
//!     image: images/sport-chrono.jpg
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use timepiece_core::{Catalog, PriceValue, Product, ProductIdError, ProductListing};

/// Errors raised while loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("catalog entry {index} ('{name}') has no usable id: {source}")]
    InvalidEntry {
        index: usize,
        name: String,
        #[source]
        source: ProductIdError,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    price: PriceValue,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl CatalogEntry {
    fn into_product(self) -> Result<Product, ProductIdError> {
        let price_text = match &self.price {
            PriceValue::Number(n) => n.to_string(),
            PriceValue::Text(s) => s.clone(),
        };
        Product::try_from(ProductListing {
            product_id: self.id.as_deref(),
            name: &self.name,
            price_text: &price_text,
            description: self.description.as_deref(),
            image: self.image.as_deref(),
            category: self.category.as_deref(),
        })
    }
}

/// Parse a catalog from YAML text.
///
/// # Errors
///
/// Returns an error if the YAML is invalid or an entry has neither an id nor
/// a name to derive one from.
pub fn parse_catalog(yaml: &str, path: &Path) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = serde_yaml::from_str(yaml).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let products = file
        .products
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let name = entry.name.clone();
            entry
                .into_product()
                .map_err(|source| CatalogError::InvalidEntry {
                    index,
                    name,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Catalog::new(products))
}

/// Load a catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&yaml, path)?;
    debug!(products = catalog.products.len(), "Catalog loaded");
    Ok(catalog)
}
