//! Shipping, tax and the order summary shown beside the cart.
//!
//! ```text
//! subtotal = sum(unit price x quantity)
//! shipping = 0 when subtotal is 0, otherwise per ShippingPolicy
//! tax      = subtotal x tax rate
//! total    = subtotal + shipping + tax
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// How the shipping fee is derived from the subtotal.
///
/// An empty (zero) subtotal never pays shipping under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum ShippingPolicy {
    /// The same fee on every non-empty order.
    Flat { fee: Decimal },
    /// The fee applies only below `threshold`; orders at or above it ship free.
    FreeOverThreshold { fee: Decimal, threshold: Decimal },
}

impl ShippingPolicy {
    /// Flat fee charged on non-empty orders by default.
    pub const DEFAULT_FEE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
    /// Subtotal from which the threshold policy ships free.
    pub const DEFAULT_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

    /// Shipping fee for `subtotal`.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal.is_zero() {
            return Decimal::ZERO;
        }
        match *self {
            Self::Flat { fee } => fee,
            Self::FreeOverThreshold { fee, threshold } => {
                if subtotal >= threshold {
                    Decimal::ZERO
                } else {
                    fee
                }
            }
        }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self::Flat {
            fee: Self::DEFAULT_FEE,
        }
    }
}

/// Shipping policy and tax rate applied to a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRules {
    pub shipping: ShippingPolicy,
    /// Flat tax rate as a fraction, e.g. `0.08`.
    pub tax_rate: Decimal,
}

impl PricingRules {
    /// 8% flat tax.
    pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            shipping: ShippingPolicy::default(),
            tax_rate: Self::DEFAULT_TAX_RATE,
        }
    }
}

/// Derived totals for a cart. Amounts are unrounded; round at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// Summary for a given subtotal.
    #[must_use]
    pub fn for_subtotal(subtotal: Decimal, rules: &PricingRules) -> Self {
        let shipping = rules.shipping.shipping_for(subtotal);
        let tax = subtotal.checked_mul(rules.tax_rate).unwrap_or(Decimal::MAX);
        let total = subtotal
            .checked_add(shipping)
            .and_then(|sum| sum.checked_add(tax))
            .unwrap_or(Decimal::MAX);
        Self {
            subtotal,
            shipping,
            tax,
            total,
        }
    }

    /// Summary for a cart.
    #[must_use]
    pub fn for_cart(cart: &Cart, rules: &PricingRules) -> Self {
        Self::for_subtotal(cart.subtotal(), rules)
    }

    /// Whether nothing is owed, i.e. the summary should be hidden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subtotal.is_zero()
    }

    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}
