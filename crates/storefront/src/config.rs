//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `TIMEPIECE_STORAGE_PATH` - File backing the storage area (default: .timepiece/local-storage.json)
//! - `TIMEPIECE_CART_KEY` - Storage key holding the cart (default: cart)
//! - `TIMEPIECE_STORAGE_QUOTA_BYTES` - Size limit of the storage area (default: unlimited)
//! - `TIMEPIECE_SHIPPING_POLICY` - `flat` or `free-over-threshold` (default: flat)
//! - `TIMEPIECE_SHIPPING_FEE` - Shipping fee on non-empty orders (default: 10)
//! - `TIMEPIECE_FREE_SHIPPING_THRESHOLD` - Subtotal that ships free under `free-over-threshold` (default: 100)
//! - `TIMEPIECE_TAX_RATE` - Tax rate as a fraction (default: 0.08)
//! - `TIMEPIECE_CURRENCY` - Display currency code (default: USD)
//! - `TIMEPIECE_CATALOG_PATH` - YAML product catalog

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use timepiece_core::{CurrencyCode, PricingRules, ShippingPolicy};

use crate::store::DEFAULT_CART_KEY;

const DEFAULT_STORAGE_PATH: &str = ".timepiece/local-storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// File backing the storage area
    pub storage_path: PathBuf,
    /// Storage key holding the cart
    pub cart_key: String,
    /// Size limit of the storage area in bytes
    pub storage_quota: Option<usize>,
    /// Shipping and tax
    pub pricing: PricingRules,
    /// Currency used to display prices
    pub currency: CurrencyCode,
    /// YAML product catalog
    pub catalog_path: Option<PathBuf>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            cart_key: DEFAULT_CART_KEY.to_string(),
            storage_quota: None,
            pricing: PricingRules::default(),
            currency: CurrencyCode::default(),
            catalog_path: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let storage_path =
            PathBuf::from(env.or_default("TIMEPIECE_STORAGE_PATH", DEFAULT_STORAGE_PATH));
        let cart_key = env.or_default("TIMEPIECE_CART_KEY", DEFAULT_CART_KEY);
        let storage_quota = env.parsed::<usize>("TIMEPIECE_STORAGE_QUOTA_BYTES")?;
        let pricing = pricing_rules(&env)?;
        let currency = env
            .optional("TIMEPIECE_CURRENCY")
            .map(|code| {
                CurrencyCode::from_str(&code).map_err(|e| invalid("TIMEPIECE_CURRENCY", e))
            })
            .transpose()?
            .unwrap_or_default();
        let catalog_path = env.optional("TIMEPIECE_CATALOG_PATH").map(PathBuf::from);

        Ok(Self {
            storage_path,
            cart_key,
            storage_quota,
            pricing,
            currency,
            catalog_path,
        })
    }
}

fn pricing_rules<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<PricingRules, ConfigError> {
    let fee = env
        .parsed::<Decimal>("TIMEPIECE_SHIPPING_FEE")?
        .unwrap_or(ShippingPolicy::DEFAULT_FEE);
    non_negative("TIMEPIECE_SHIPPING_FEE", fee)?;

    let shipping = match env.or_default("TIMEPIECE_SHIPPING_POLICY", "flat").as_str() {
        "flat" => ShippingPolicy::Flat { fee },
        "free-over-threshold" => {
            let threshold = env
                .parsed::<Decimal>("TIMEPIECE_FREE_SHIPPING_THRESHOLD")?
                .unwrap_or(ShippingPolicy::DEFAULT_THRESHOLD);
            non_negative("TIMEPIECE_FREE_SHIPPING_THRESHOLD", threshold)?;
            ShippingPolicy::FreeOverThreshold { fee, threshold }
        }
        other => {
            return Err(invalid(
                "TIMEPIECE_SHIPPING_POLICY",
                format!("unknown policy '{other}' (expected flat or free-over-threshold)"),
            ));
        }
    };

    let tax_rate = env
        .parsed::<Decimal>("TIMEPIECE_TAX_RATE")?
        .unwrap_or(PricingRules::DEFAULT_TAX_RATE);
    non_negative("TIMEPIECE_TAX_RATE", tax_rate)?;

    Ok(PricingRules { shipping, tax_rate })
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse an optional variable.
    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|value| value.parse::<T>().map_err(|e| invalid(key, e)))
            .transpose()
    }
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

fn non_negative(key: &str, value: Decimal) -> Result<(), ConfigError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid(key, "must not be negative"));
    }
    Ok(())
}
