//! Line item quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when converting a count into a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The count is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
}

/// Number of units of one product in the cart.
///
/// Always at least 1: an item whose quantity would drop to zero is removed
/// from the cart instead of being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(count: u32) -> Option<Self> {
        match NonZeroU32::new(count) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Create a quantity from a signed count.
    ///
    /// Counts above `u32::MAX` saturate.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] if `count <= 0`.
    pub fn from_count(count: i64) -> Result<Self, QuantityError> {
        if count <= 0 {
            return Err(QuantityError::NotPositive(count));
        }
        let clamped = u32::try_from(count).unwrap_or(u32::MAX);
        Self::new(clamped).ok_or(QuantityError::NotPositive(count))
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// One more unit, saturating at `u32::MAX`.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One less unit, or `None` when this is the last one.
    #[must_use]
    pub const fn decrement(self) -> Option<Self> {
        Self::new(self.0.get() - 1)
    }

    /// Sum of two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(count: i64) -> Result<Self, Self::Error> {
        Self::from_count(count)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

/// Coerce user-entered quantity text to an integer.
///
/// Reads an optional sign and the leading run of ASCII digits, ignoring
/// leading whitespace and anything after the digits, so `"3.7"` is 3 and
/// `"12 pcs"` is 12. Returns `None` when no digits lead the input.
/// Values beyond the `i64` range saturate.
#[must_use]
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..).unwrap_or("")),
        Some(b'+') => (false, trimmed.get(1..).unwrap_or("")),
        _ => (false, trimmed),
    };

    let digits: Vec<i64> = rest
        .chars()
        .map_while(|c| c.to_digit(10))
        .map(i64::from)
        .collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.into_iter().fold(0_i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(digit)
    });
    Some(if negative { -magnitude } else { magnitude })
}
