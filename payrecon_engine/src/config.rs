use std::{env, time::Duration};

use log::*;
use payrecon_common::{parse_decimal, DEFAULT_MINOR_UNIT_FACTOR};
use rust_decimal::Decimal;

use crate::reconciler::OrderDefaults;

const DEFAULT_CURRENCY: &str = "aed";
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

fn fallback_order_price() -> Decimal {
    Decimal::new(3500, 2)
}

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Used when an order has to be created from an event that carries no amount.
    pub default_order_price: Decimal,
    /// Used when an order has to be created from an event that carries no currency.
    pub default_currency: String,
    /// Minor units per major unit. Gateway amounts are divided by this.
    pub minor_unit_factor: u32,
    /// Upper bound on any single ledger or order store call.
    pub store_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            default_order_price: fallback_order_price(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            minor_unit_factor: DEFAULT_MINOR_UNIT_FACTOR,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

impl ReconcilerConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let default_order_price = env::var("PAYRECON_DEFAULT_ORDER_PRICE")
            .ok()
            .and_then(|s| {
                let price = parse_decimal(&s);
                if price.is_none() {
                    warn!("🪛️ Invalid PAYRECON_DEFAULT_ORDER_PRICE ({s}). Using {}.", fallback_order_price());
                }
                price
            })
            .unwrap_or(defaults.default_order_price);
        let default_currency = env::var("PAYRECON_DEFAULT_CURRENCY")
            .ok()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_currency);
        let minor_unit_factor = env::var("PAYRECON_MINOR_UNIT_FACTOR")
            .ok()
            .and_then(|s| match s.trim().parse::<u32>() {
                Ok(0) | Err(_) => {
                    warn!("🪛️ Invalid PAYRECON_MINOR_UNIT_FACTOR ({s}). Using {DEFAULT_MINOR_UNIT_FACTOR}.");
                    None
                },
                Ok(f) => Some(f),
            })
            .unwrap_or(defaults.minor_unit_factor);
        let store_timeout = env::var("PAYRECON_STORE_TIMEOUT")
            .ok()
            .and_then(|s| match s.trim().parse::<u64>() {
                Ok(0) | Err(_) => {
                    warn!("🪛️ Invalid PAYRECON_STORE_TIMEOUT ({s}). Using the default.");
                    None
                },
                Ok(secs) => Some(Duration::from_secs(secs)),
            })
            .unwrap_or(defaults.store_timeout);
        Self { default_order_price, default_currency, minor_unit_factor, store_timeout }
    }

    pub fn order_defaults(&self) -> OrderDefaults {
        OrderDefaults { price: self.default_order_price, currency: self.default_currency.clone() }
    }
}
