//! Products offered on listing pages and the category catalog.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{PriceValue, ProductId, ProductIdError};

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: PriceValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Create a product with no display metadata.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: PriceValue) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: None,
            image: None,
            category: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Raw data scraped from a product card on a listing page.
#[derive(Debug, Clone, Default)]
pub struct ProductListing<'a> {
    /// Explicit product id, if the card declares one.
    pub product_id: Option<&'a str>,
    pub name: &'a str,
    /// Price as displayed, e.g. `"$1,299.00"`.
    pub price_text: &'a str,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub category: Option<&'a str>,
}

impl TryFrom<ProductListing<'_>> for Product {
    type Error = ProductIdError;

    /// Build a product from a listing card.
    ///
    /// Without an explicit id the id is derived from the name. The displayed
    /// price is normalized once here so the cart stores a number. Blank
    /// metadata is treated as absent.
    fn try_from(listing: ProductListing<'_>) -> Result<Self, Self::Error> {
        let id = match listing.product_id.filter(|id| !id.trim().is_empty()) {
            Some(explicit) => ProductId::parse(explicit)?,
            None => ProductId::from_name(listing.name)?,
        };
        let non_blank =
            |value: Option<&str>| value.filter(|v| !v.trim().is_empty()).map(str::to_owned);

        let amount = crate::types::normalize_price(listing.price_text);
        let price = serde_json::Number::from_str(&amount.to_string())
            .map_or_else(|_| PriceValue::default(), PriceValue::Number);

        Ok(Self {
            id,
            name: listing.name.trim().to_owned(),
            price,
            description: non_blank(listing.description),
            image: non_blank(listing.image),
            category: non_blank(listing.category),
        })
    }
}

/// Category selection for a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every product.
    #[default]
    All,
    /// Products whose category matches exactly.
    Category(String),
}

impl CategoryFilter {
    /// Whether `product` passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Category(wanted) => product.category.as_deref() == Some(wanted.as_str()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    /// `"all"` selects everything; any other value is a category name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "all" {
            Self::All
        } else {
            Self::Category(s.to_owned())
        })
    }
}

/// The set of products offered by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Catalog {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// Products passing `filter`, in catalog order.
    pub fn filter<'a>(&'a self, filter: &'a CategoryFilter) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |product| filter.matches(product))
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in self.products.iter().filter_map(|p| p.category.as_deref()) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::new(
                ProductId::parse("w1").unwrap(),
                "Aviator",
                PriceValue::from(250_u32),
            )
            .with_category("luxury"),
            Product::new(
                ProductId::parse("w2").unwrap(),
                "Runner",
                PriceValue::from("$89.00"),
            )
            .with_category("sport"),
            Product::new(
                ProductId::parse("w3").unwrap(),
                "Regent",
                PriceValue::from(1200_u32),
            )
            .with_category("luxury"),
        ])
    }

    #[test]
    fn test_listing_with_explicit_id() {
        let product = Product::try_from(ProductListing {
            product_id: Some("sku-9"),
            name: "Classic Watch",
            price_text: "$1,299.00",
            description: Some("Steel case"),
            image: Some(""),
            category: Some("luxury"),
        })
        .unwrap();

        assert_eq!(product.id.as_str(), "sku-9");
        assert_eq!(product.price.amount(), Decimal::new(1299, 0));
        assert_eq!(product.description.as_deref(), Some("Steel case"));
        assert_eq!(product.image, None);
        assert_eq!(product.category.as_deref(), Some("luxury"));
    }

    #[test]
    fn test_listing_id_derived_from_name() {
        let product = Product::try_from(ProductListing {
            product_id: Some(" "),
            name: "Ocean Diver Pro",
            price_text: "$99",
            ..ProductListing::default()
        })
        .unwrap();
        assert_eq!(product.id.as_str(), "ocean-diver-pro");
    }

    #[test]
    fn test_listing_without_name_or_id_fails() {
        let result = Product::try_from(ProductListing {
            name: "",
            price_text: "$10",
            ..ProductListing::default()
        });
        assert_eq!(result, Err(ProductIdError::Empty));
    }

    #[test]
    fn test_filter_all() {
        let catalog = catalog();
        assert_eq!(catalog.filter(&CategoryFilter::All).count(), 3);
    }

    #[test]
    fn test_filter_by_category() {
        let catalog = catalog();
        let filter: CategoryFilter = "luxury".parse().unwrap();
        let names: Vec<&str> = catalog.filter(&filter).map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Aviator", "Regent"]);

        let none = CategoryFilter::Category("dress".to_string());
        assert_eq!(catalog.filter(&none).count(), 0);
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(catalog().categories(), ["luxury", "sport"]);
    }

    #[test]
    fn test_get() {
        let catalog = catalog();
        let id = ProductId::parse("w2").unwrap();
        assert_eq!(catalog.get(&id).unwrap().name, "Runner");
        assert!(catalog.get(&ProductId::parse("w9").unwrap()).is_none());
    }

    #[test]
    fn test_catalog_deserialize() {
        let json = r#"{"products": [{"id": "w1", "name": "Aviator", "price": "$250"}]}"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.products[0].category, None);
    }
}
