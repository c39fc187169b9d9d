//! Price normalization and display using decimal arithmetic.
//!
//! Listing pages and persisted carts supply prices either as JSON numbers
//! (`1234.5`) or as display text (`"$1,234.50"`). Every consumer goes through
//! [`normalize_price`] so both forms produce identical totals.

use core::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Normalize a raw price to a non-negative decimal amount.
///
/// Every character other than an ASCII digit, `.` or `-` is dropped and the
/// remainder is parsed as a number. Unparsable or non-finite input is 0, as
/// is a negative result. Finite amounts beyond the decimal range saturate at
/// [`Decimal::MAX`].
///
/// ```
/// use rust_decimal::Decimal;
/// use timepiece_core::normalize_price;
///
/// assert_eq!(normalize_price("$1,234.56"), Decimal::new(123_456, 2));
/// assert_eq!(normalize_price("abc"), Decimal::ZERO);
/// ```
#[must_use]
pub fn normalize_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    let Ok(value) = cleaned.parse::<f64>() else {
        return Decimal::ZERO;
    };
    if !value.is_finite() {
        return Decimal::ZERO;
    }

    // Exact decimal parse first; the float fallback covers forms like ".5"
    // and "5." that the decimal parser may reject.
    let amount = Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .unwrap_or_else(|| saturated(value));

    amount.max(Decimal::ZERO).normalize()
}

/// Bound for a finite value that does not fit in a `Decimal`.
fn saturated(value: f64) -> Decimal {
    if value > 0.0 { Decimal::MAX } else { Decimal::ZERO }
}

/// A price exactly as it was supplied: a JSON number or display text.
///
/// The original form is kept so a persisted cart is rewritten unchanged;
/// arithmetic always uses [`PriceValue::amount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    /// Numeric price, e.g. `49.99`.
    Number(serde_json::Number),
    /// Text price, e.g. `"$49.99"`.
    Text(String),
}

impl PriceValue {
    /// Normalized amount of this price.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Number(n) => {
                let text = n.to_string();
                if text.contains(['e', 'E']) {
                    Decimal::from_scientific(&text).map_or_else(
                        |_| n.as_f64().map_or(Decimal::ZERO, saturated),
                        |amount| amount.max(Decimal::ZERO).normalize(),
                    )
                } else {
                    normalize_price(&text)
                }
            }
            Self::Text(s) => normalize_price(s),
        }
    }
}

impl Default for PriceValue {
    fn default() -> Self {
        Self::Number(serde_json::Number::from(0))
    }
}

impl From<&str> for PriceValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PriceValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u32> for PriceValue {
    fn from(value: u32) -> Self {
        Self::Number(serde_json::Number::from(value))
    }
}

impl From<f64> for PriceValue {
    /// Non-finite floats have no JSON form and become `0`.
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or_else(Self::default, Self::Number)
    }
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Amount rounded to cents, half away from zero.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Formats as symbol plus two decimals, e.g. `$1234.50`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.rounded())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for this currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_currency_text() {
        assert_eq!(normalize_price("$1,234.56"), dec("1234.56"));
        assert_eq!(normalize_price("$49.99"), dec("49.99"));
        assert_eq!(normalize_price("USD 10"), dec("10"));
    }

    #[test]
    fn test_normalize_unparsable_is_zero() {
        assert_eq!(normalize_price("abc"), Decimal::ZERO);
        assert_eq!(normalize_price(""), Decimal::ZERO);
        assert_eq!(normalize_price("1.2.3"), Decimal::ZERO);
        assert_eq!(normalize_price("--5"), Decimal::ZERO);
        assert_eq!(normalize_price("-"), Decimal::ZERO);
    }

    #[test]
    fn test_normalize_negative_clamps_to_zero() {
        assert_eq!(normalize_price("-5.00"), Decimal::ZERO);
    }

    #[test]
    fn test_normalize_partial_decimals() {
        assert_eq!(normalize_price(".5"), dec("0.5"));
        assert_eq!(normalize_price("5."), dec("5"));
    }

    #[test]
    fn test_normalize_out_of_decimal_range_saturates() {
        assert_eq!(normalize_price(&"9".repeat(29)), Decimal::MAX);
        assert_eq!(normalize_price(&format!("-{}", "9".repeat(29))), Decimal::ZERO);
        // Overflows f64 as well, so it is non-finite.
        assert_eq!(normalize_price(&"9".repeat(400)), Decimal::ZERO);

        let huge: PriceValue = serde_json::from_str("1e40").unwrap();
        assert_eq!(huge.amount(), Decimal::MAX);
    }

    #[test]
    fn test_number_and_text_agree() {
        let number: PriceValue = serde_json::from_str("1234.5").unwrap();
        let text: PriceValue = serde_json::from_str("\"$1,234.50\"").unwrap();
        assert_eq!(number.amount(), text.amount());
        assert_eq!(PriceValue::from(19.99).amount(), dec("19.99"));
    }

    #[test]
    fn test_price_value_keeps_original_form() {
        let text = PriceValue::from("$49.99");
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"$49.99\"");

        let number = PriceValue::from(10_u32);
        assert_eq!(serde_json::to_string(&number).unwrap(), "10");
    }

    #[test]
    fn test_non_finite_float_is_zero() {
        assert_eq!(PriceValue::from(f64::NAN).amount(), Decimal::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::new(dec("1234.5"), CurrencyCode::USD).to_string(), "$1234.50");
        assert_eq!(Price::new(dec("0.125"), CurrencyCode::USD).to_string(), "$0.13");
        assert_eq!(Price::new(Decimal::ZERO, CurrencyCode::USD).to_string(), "$0.00");
        assert_eq!(
            Price::new(dec("3"), CurrencyCode::GBP).to_string(),
            "£3.00"
        );
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
