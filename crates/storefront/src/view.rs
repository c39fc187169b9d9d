//! Display data for the cart page.
//!
//! Views are rebuilt from the [`Cart`] on every change notification; they
//! hold only formatted strings and never read storage themselves.

use rust_decimal::Decimal;
use serde::Serialize;

use timepiece_core::{Cart, CurrencyCode, LineItem, OrderSummary, Price, PricingRules};

/// Cart item display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub quantity: u32,
    /// Unit price, e.g. `$49.99`.
    pub price: String,
    /// Unit price times quantity.
    pub line_total: String,
}

/// Order summary display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub subtotal: String,
    /// `Free` when no shipping is owed.
    pub shipping: String,
    pub tax: String,
    pub total: String,
    /// Hidden while the cart is empty.
    pub visible: bool,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    pub summary: SummaryView,
}

impl CartView {
    /// Build the view for `cart`.
    #[must_use]
    pub fn build(cart: &Cart, rules: &PricingRules, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::build(item, currency))
                .collect(),
            item_count: cart.item_count(),
            summary: SummaryView::build(&OrderSummary::for_cart(cart, rules), currency),
        }
    }

    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self::build(&Cart::new(), &PricingRules::default(), CurrencyCode::default())
    }

    /// Whether to show the "cart is empty" message instead of items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CartItemView {
    fn build(item: &LineItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            quantity: item.quantity.get(),
            price: format_price(item.unit_price(), currency),
            line_total: format_price(item.line_total(), currency),
        }
    }
}

impl SummaryView {
    fn build(summary: &OrderSummary, currency: CurrencyCode) -> Self {
        Self {
            subtotal: format_price(summary.subtotal, currency),
            shipping: if summary.ships_free() {
                "Free".to_string()
            } else {
                format_price(summary.shipping, currency)
            },
            tax: format_price(summary.tax, currency),
            total: format_price(summary.total, currency),
            visible: !summary.is_empty(),
        }
    }
}

/// Format an amount with two decimals and the currency symbol.
fn format_price(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).to_string()
}
