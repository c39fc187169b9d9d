//! Cart line items and the cart list.
//!
//! The persisted form is a JSON array of line item objects:
//!
//! ```json
//! [{ "id": "w1", "name": "Watch", "price": "$49.99", "quantity": 2,
//!    "description": "...", "image": "...", "category": "luxury" }]
//! ```
//!
//! There is no schema version, so [`Cart::from_json`] is lenient: prices may be
//! numbers or text, optional fields may be missing, and entries that cannot be
//! repaired are dropped and reported as [`LoadIssue`]s instead of failing the
//! whole load.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::product::Product;
use crate::types::{PriceValue, ProductId, Quantity, parse_quantity};

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    pub price: PriceValue,
    pub quantity: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Fields this version does not know about, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineItem {
    /// Create a line item for a product with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price.clone(),
            quantity: Quantity::ONE,
            description: product.description.clone(),
            image: product.image.clone(),
            category: product.category.clone(),
            extra: Map::new(),
        }
    }

    /// Normalized unit price.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.amount()
    }

    /// Unit price times quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price()
            .checked_mul(Decimal::from(self.quantity.get()))
            .unwrap_or(Decimal::MAX)
    }

    /// Build a line item from one persisted JSON object.
    fn from_stored(value: Value) -> Result<Self, LoadIssue> {
        let Value::Object(mut fields) = value else {
            return Err(LoadIssue::NotAnObject);
        };

        let id = match fields.remove("id") {
            Some(Value::String(s)) => ProductId::parse(&s).ok(),
            Some(Value::Number(n)) => ProductId::parse(&n.to_string()).ok(),
            _ => None,
        }
        .ok_or(LoadIssue::MissingId)?;

        let quantity = match fields.remove("quantity") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
                .or_else(|| n.as_f64().map(truncate_count)),
            Some(Value::String(s)) => parse_quantity(&s),
            _ => None,
        }
        .and_then(|count| Quantity::from_count(count).ok())
        .ok_or_else(|| LoadIssue::InvalidQuantity(id.clone()))?;

        let price = match fields.remove("price") {
            Some(Value::Number(n)) => PriceValue::Number(n),
            Some(Value::String(s)) => PriceValue::Text(s),
            _ => PriceValue::default(),
        };

        let name = match fields.remove("name") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };

        Ok(Self {
            id,
            name,
            price,
            quantity,
            description: take_string(&mut fields, "description"),
            image: take_string(&mut fields, "image"),
            category: take_string(&mut fields, "category"),
            extra: fields,
        })
    }
}

/// Remove `key` from `fields` if it holds a string.
///
/// Non-string values stay in place and are carried as extra fields.
fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !matches!(fields.get(key), Some(Value::String(_))) {
        return None;
    }
    match fields.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Integer part of a float count, saturating at the `i64` range.
#[allow(clippy::cast_possible_truncation)] // `as` saturates and truncation is the intent
fn truncate_count(value: f64) -> i64 {
    if value.is_finite() { value.trunc() as i64 } else { 0 }
}

/// A persisted entry that was dropped or merged while loading a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadIssue {
    /// The array element is not a JSON object.
    NotAnObject,
    /// The entry has no usable id.
    MissingId,
    /// The entry's quantity is missing, unparsable or below 1.
    InvalidQuantity(ProductId),
    /// A second entry with the same id; its quantity was merged into the first.
    DuplicateId(ProductId),
}

impl std::fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "cart entry is not an object"),
            Self::MissingId => write!(f, "cart entry has no id"),
            Self::InvalidQuantity(id) => write!(f, "cart entry {id} has an invalid quantity"),
            Self::DuplicateId(id) => write!(f, "cart entry {id} appears more than once"),
        }
    }
}

/// Errors that make a persisted cart unreadable as a whole.
#[derive(thiserror::Error, Debug)]
pub enum CartParseError {
    /// The stored text is not JSON.
    #[error("cart data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The stored JSON is not an array.
    #[error("cart data is not a JSON array")]
    NotAnArray,
}

/// Result of loading a persisted cart.
#[derive(Debug, Clone, Default)]
pub struct CartLoad {
    /// The repaired cart.
    pub cart: Cart,
    /// Entries that were dropped or merged.
    pub issues: Vec<LoadIssue>,
}

/// Ordered list of line items, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn get_mut(&mut self, id: &ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Add one unit of a product.
    ///
    /// An existing line only has its quantity incremented; its name, price and
    /// other fields are kept even if `product` carries different values.
    /// Returns the line's resulting quantity.
    pub fn add(&mut self, product: &Product) -> Quantity {
        if let Some(item) = self.get_mut(&product.id) {
            item.quantity = item.quantity.increment();
            return item.quantity;
        }
        self.items.push(LineItem::from_product(product));
        Quantity::ONE
    }

    /// Remove the line for `id`, returning it. Absent ids are a no-op.
    pub fn remove(&mut self, id: &ProductId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Replace the quantity of the line for `id`.
    ///
    /// A count of 0 or below removes the line. Returns `false` when no line
    /// matches `id`.
    pub fn set_quantity(&mut self, id: &ProductId, count: i64) -> bool {
        let Ok(quantity) = Quantity::from_count(count) else {
            return self.remove(id).is_some();
        };
        match self.get_mut(id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Add one unit to an existing line, returning the new quantity.
    pub fn increase(&mut self, id: &ProductId) -> Option<Quantity> {
        let item = self.get_mut(id)?;
        item.quantity = item.quantity.increment();
        Some(item.quantity)
    }

    /// Take one unit off an existing line, never going below 1.
    ///
    /// Returns the new quantity, or `None` if the line is missing or already
    /// at a single unit.
    pub fn decrease(&mut self, id: &ProductId) -> Option<Quantity> {
        let item = self.get_mut(id)?;
        let quantity = item.quantity.decrement()?;
        item.quantity = quantity;
        Some(quantity)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `unit price x quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().fold(Decimal::ZERO, |acc, item| {
            acc.checked_add(item.line_total()).unwrap_or(Decimal::MAX)
        })
    }

    /// Total number of units, shown in the header cart badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Serialize the full list for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if an extra field cannot be serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load a persisted cart, repairing what can be repaired.
    ///
    /// Entries without an id or with a quantity below 1 are dropped, and
    /// duplicate ids are merged into the first occurrence by summing
    /// quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not JSON or not a JSON array.
    pub fn from_json(raw: &str) -> Result<CartLoad, CartParseError> {
        let Value::Array(entries) = serde_json::from_str::<Value>(raw)? else {
            return Err(CartParseError::NotAnArray);
        };

        let mut load = CartLoad::default();
        for entry in entries {
            match LineItem::from_stored(entry) {
                Ok(item) => {
                    if let Some(existing) = load.cart.get_mut(&item.id) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity);
                        load.issues.push(LoadIssue::DuplicateId(item.id));
                    } else {
                        load.cart.items.push(item);
                    }
                }
                Err(issue) => load.issues.push(issue),
            }
        }
        Ok(load)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn watch() -> Product {
        Product::new(id("w1"), "Watch", PriceValue::from("$49.99"))
    }

    fn cart_with(product: &Product, quantity: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add(product);
        cart.set_quantity(&product.id, quantity);
        cart
    }

    #[test]
    fn test_add_new_product() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(&watch()), Quantity::ONE);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal(), dec("49.99"));
    }

    #[test]
    fn test_add_twice_increments() {
        let mut cart = Cart::new();
        cart.add(&watch());
        cart.add(&watch());
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity.get(), 2);
    }

    #[test]
    fn test_add_existing_keeps_stored_fields() {
        let mut cart = Cart::new();
        cart.add(&watch());

        let repriced = Product::new(id("w1"), "Renamed", PriceValue::from(1_u32));
        cart.add(&repriced);

        let item = cart.get(&id("w1")).unwrap();
        assert_eq!(item.name, "Watch");
        assert_eq!(item.price, PriceValue::from("$49.99"));
        assert_eq!(item.quantity.get(), 2);
    }

    #[test]
    fn test_add_preserves_order() {
        let mut cart = Cart::new();
        cart.add(&Product::new(id("b"), "B", PriceValue::from(1_u32)));
        cart.add(&Product::new(id("a"), "A", PriceValue::from(1_u32)));
        cart.add(&Product::new(id("b"), "B", PriceValue::from(1_u32)));

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(&watch());
        let before = cart.clone();

        assert!(cart.remove(&id("missing")).is_none());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_replaces() {
        let product = Product::new(id("t"), "Ten", PriceValue::from(10_u32));
        let mut cart = cart_with(&product, 3);
        assert_eq!(cart.subtotal(), dec("30"));

        assert!(cart.set_quantity(&product.id, 5));
        assert_eq!(cart.subtotal(), dec("50"));
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let mut by_zero = cart_with(&watch(), 2);
        by_zero.add(&Product::new(id("other"), "Other", PriceValue::from(3_u32)));
        let mut by_remove = by_zero.clone();

        by_zero.set_quantity(&id("w1"), 0);
        by_remove.remove(&id("w1"));
        assert_eq!(by_zero, by_remove);

        let mut negative = cart_with(&watch(), 2);
        negative.set_quantity(&id("w1"), -3);
        assert!(negative.is_empty());
    }

    #[test]
    fn test_set_quantity_missing_id() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity(&id("nope"), 4));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increase_and_decrease() {
        let mut cart = cart_with(&watch(), 2);
        assert_eq!(cart.increase(&id("w1")).unwrap().get(), 3);
        assert_eq!(cart.decrease(&id("w1")).unwrap().get(), 2);
        assert_eq!(cart.decrease(&id("w1")).unwrap().get(), 1);

        // A single unit is never decreased away.
        assert!(cart.decrease(&id("w1")).is_none());
        assert_eq!(cart.get(&id("w1")).unwrap().quantity, Quantity::ONE);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = cart_with(&watch(), 3);
        cart.add(&Product::new(id("b"), "Band", PriceValue::from(5_u32)));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_mixed_price_forms_total_identically() {
        let mut text = Cart::new();
        text.add(&Product::new(id("x"), "X", PriceValue::from("$1,234.50")));
        let mut number = Cart::new();
        number.add(&Product::new(id("x"), "X", PriceValue::from(1234.5)));
        assert_eq!(text.subtotal(), number.subtotal());
    }

    #[test]
    fn test_subtotal_saturates() {
        let product = Product::new(
            id("big"),
            "Big",
            PriceValue::from("79228162514264337593543950335"),
        );
        let cart = cart_with(&product, 1000);
        assert_eq!(cart.subtotal(), Decimal::MAX);
    }

    #[test]
    fn test_json_round_trip_keeps_total() {
        let mut cart = cart_with(&watch(), 3);
        cart.add(&Product::new(id("b"), "Band", PriceValue::from(12.5)));

        let load = Cart::from_json(&cart.to_json().unwrap()).unwrap();
        assert!(load.issues.is_empty());
        assert_eq!(load.cart, cart);
        assert_eq!(load.cart.subtotal(), cart.subtotal());
    }

    #[test]
    fn test_to_json_layout() {
        let cart = cart_with(&watch(), 2);
        let value: Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "id": "w1", "name": "Watch", "price": "$49.99", "quantity": 2 }])
        );
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(matches!(
            Cart::from_json("not json"),
            Err(CartParseError::Json(_))
        ));
        assert!(matches!(
            Cart::from_json("{\"id\":\"w1\"}"),
            Err(CartParseError::NotAnArray)
        ));
    }

    #[test]
    fn test_from_json_tolerates_loose_entries() {
        let raw = r#"[
            {"id": "a", "name": "A", "price": "$5.00", "quantity": "2"},
            {"id": 7, "price": 3, "quantity": 1.9},
            {"id": "c", "name": "C", "price": 1, "quantity": 1, "category": 4}
        ]"#;
        let load = Cart::from_json(raw).unwrap();
        assert!(load.issues.is_empty());

        let cart = load.cart;
        assert_eq!(cart.get(&id("a")).unwrap().quantity.get(), 2);

        let numeric = cart.get(&id("7")).unwrap();
        assert_eq!(numeric.name, "");
        assert_eq!(numeric.quantity, Quantity::ONE);

        let c = cart.get(&id("c")).unwrap();
        assert_eq!(c.category, None);
        assert_eq!(c.extra.get("category"), Some(&serde_json::json!(4)));
        assert_eq!(cart.subtotal(), dec("14"));
    }

    #[test]
    fn test_from_json_drops_invalid_entries() {
        let raw = r#"[
            "stray",
            {"name": "no id", "price": 1, "quantity": 1},
            {"id": "zero", "price": 1, "quantity": 0},
            {"id": "ok", "price": 2, "quantity": 1}
        ]"#;
        let load = Cart::from_json(raw).unwrap();
        assert_eq!(load.cart.len(), 1);
        assert_eq!(
            load.issues,
            vec![
                LoadIssue::NotAnObject,
                LoadIssue::MissingId,
                LoadIssue::InvalidQuantity(id("zero")),
            ]
        );
    }

    #[test]
    fn test_from_json_merges_duplicates() {
        let raw = r#"[
            {"id": "a", "name": "first", "price": 1, "quantity": 2},
            {"id": "a", "name": "second", "price": 9, "quantity": 3}
        ]"#;
        let load = Cart::from_json(raw).unwrap();
        let item = load.cart.get(&id("a")).unwrap();
        assert_eq!(item.name, "first");
        assert_eq!(item.quantity.get(), 5);
        assert_eq!(load.issues, vec![LoadIssue::DuplicateId(id("a"))]);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = r#"[{"id": "a", "name": "A", "price": 1, "quantity": 1, "sku": "A-1"}]"#;
        let load = Cart::from_json(raw).unwrap();
        let rewritten: Value = serde_json::from_str(&load.cart.to_json().unwrap()).unwrap();
        assert_eq!(rewritten[0]["sku"], "A-1");
    }
}
