//! Typed cart actions raised by the page controls.
//!
//! Each control on the cart page maps to one [`CartAction`] keyed by product
//! id; [`CartStore::dispatch`] applies it and reports what happened.

use tracing::{debug, info, instrument};

use timepiece_core::{Cart, OrderSummary, PricingRules, Product, ProductId, parse_quantity};

use crate::error::Result;
use crate::storage::Storage;
use crate::store::CartStore;

/// A user action on the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// "Add to cart" on a product card.
    Add(Product),
    /// The `+` control.
    Increase(ProductId),
    /// The `-` control. Stops at one unit.
    Decrease(ProductId),
    /// The quantity input, with the raw text entered.
    SetQuantity { id: ProductId, input: String },
    /// The remove button.
    Remove(ProductId),
    /// The checkout button.
    Checkout,
}

/// Result of dispatching a [`CartAction`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The action ran; this is the cart afterwards.
    Updated(Cart),
    /// The input was not a positive quantity and nothing changed.
    Ignored,
    /// Checkout was requested with nothing in the cart.
    EmptyCart,
    /// The order was placed and the cart cleared.
    OrderPlaced(OrderSummary),
}

impl ActionOutcome {
    /// Message shown to the shopper, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<&'static str> {
        match self {
            Self::EmptyCart => Some("Your cart is empty!"),
            Self::OrderPlaced(_) => Some("Thank you for your order!"),
            Self::Updated(_) | Self::Ignored => None,
        }
    }
}

impl<S: Storage> CartStore<S> {
    /// Apply one cart action.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area fails.
    #[instrument(skip(self, rules), fields(key = %self.key()))]
    pub fn dispatch(&mut self, action: CartAction, rules: &PricingRules) -> Result<ActionOutcome> {
        let cart = match action {
            CartAction::Add(product) => self.add(&product)?,
            CartAction::Increase(id) => self.increase(&id)?,
            CartAction::Decrease(id) => self.decrease(&id)?,
            CartAction::Remove(id) => self.remove(&id)?,
            CartAction::SetQuantity { id, input } => {
                match parse_quantity(&input).filter(|&count| count > 0) {
                    Some(count) => self.set_quantity(&id, count)?,
                    None => {
                        debug!(%id, input = %input, "Ignoring quantity input");
                        return Ok(ActionOutcome::Ignored);
                    }
                }
            }
            CartAction::Checkout => return self.checkout(rules),
        };
        Ok(ActionOutcome::Updated(cart))
    }

    fn checkout(&mut self, rules: &PricingRules) -> Result<ActionOutcome> {
        let cart = self.read()?;
        if cart.is_empty() {
            return Ok(ActionOutcome::EmptyCart);
        }
        let summary = OrderSummary::for_cart(&cart, rules);
        self.clear()?;
        info!(
            items = cart.len(),
            units = cart.item_count(),
            total = %summary.total,
            "Order placed"
        );
        Ok(ActionOutcome::OrderPlaced(summary))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use timepiece_core::PriceValue;

    use super::*;
    use crate::storage::MemoryStorage;

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn seeded() -> CartStore<MemoryStorage> {
        let mut store = CartStore::new(MemoryStorage::new());
        store
            .add(&Product::new(id("w1"), "Watch", PriceValue::from("$40.00")))
            .unwrap();
        store
    }

    fn quantity_of(store: &CartStore<MemoryStorage>, product: &str) -> Option<u32> {
        store
            .read()
            .unwrap()
            .get(&id(product))
            .map(|item| item.quantity.get())
    }

    #[test]
    fn test_dispatch_add() {
        let mut store = CartStore::new(MemoryStorage::new());
        let product = Product::new(id("w2"), "Dress Watch", PriceValue::from(99_u32));
        let outcome = store
            .dispatch(CartAction::Add(product), &PricingRules::default())
            .unwrap();
        let ActionOutcome::Updated(cart) = outcome else {
            panic!("expected update");
        };
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_increase_then_decrease_floor() {
        let mut store = seeded();
        let rules = PricingRules::default();

        store.dispatch(CartAction::Increase(id("w1")), &rules).unwrap();
        assert_eq!(quantity_of(&store, "w1"), Some(2));

        store.dispatch(CartAction::Decrease(id("w1")), &rules).unwrap();
        store.dispatch(CartAction::Decrease(id("w1")), &rules).unwrap();
        assert_eq!(quantity_of(&store, "w1"), Some(1));
    }

    #[test]
    fn test_quantity_input() {
        let mut store = seeded();
        let rules = PricingRules::default();
        let set = |input: &str| CartAction::SetQuantity {
            id: id("w1"),
            input: input.to_string(),
        };

        store.dispatch(set(" 4 items"), &rules).unwrap();
        assert_eq!(quantity_of(&store, "w1"), Some(4));

        assert_eq!(store.dispatch(set("0"), &rules).unwrap(), ActionOutcome::Ignored);
        assert_eq!(store.dispatch(set("-2"), &rules).unwrap(), ActionOutcome::Ignored);
        assert_eq!(store.dispatch(set("abc"), &rules).unwrap(), ActionOutcome::Ignored);
        assert_eq!(quantity_of(&store, "w1"), Some(4));
    }

    #[test]
    fn test_remove() {
        let mut store = seeded();
        let outcome = store
            .dispatch(CartAction::Remove(id("w1")), &PricingRules::default())
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Updated(Cart::new()));
    }

    #[test]
    fn test_checkout_empty() {
        let mut store = CartStore::new(MemoryStorage::new());
        let outcome = store
            .dispatch(CartAction::Checkout, &PricingRules::default())
            .unwrap();
        assert_eq!(outcome, ActionOutcome::EmptyCart);
        assert_eq!(outcome.notice(), Some("Your cart is empty!"));
    }

    #[test]
    fn test_checkout_places_order_and_clears() {
        let mut store = seeded();
        let outcome = store
            .dispatch(CartAction::Checkout, &PricingRules::default())
            .unwrap();

        let ActionOutcome::OrderPlaced(summary) = outcome else {
            panic!("expected order");
        };
        assert_eq!(summary.subtotal, Decimal::from(40));
        assert_eq!(summary.total, Decimal::from_str("53.2").unwrap());
        assert!(store.read().unwrap().is_empty());
    }
}
