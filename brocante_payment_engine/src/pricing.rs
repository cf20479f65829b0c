//! Commission and price-breakdown calculations.
//!
//! Everything here is pure and deterministic. An order's breakdown is computed once, from the settings snapshot that
//! was live at creation, and stored on the order forever; later settings changes never touch existing orders.

use bpg_common::Money;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::OrderType;

/// Fallback commission rate, in percent, when the stored configuration is absent or unusable.
pub const DEFAULT_COMMISSION_PERCENTAGE: f64 = 8.0;
/// Fallback fixed commission and minimum commission, in agorot (₪5.00).
pub const DEFAULT_COMMISSION_FLOOR: i64 = 500;
/// Fallback delivery fee, in agorot (₪35.00).
pub const DEFAULT_SHIPPING_FEE: i64 = 3_500;

#[derive(Debug, Clone, Error)]
pub enum PricingError {
    #[error("Asking price may not be negative: {0}")]
    InvalidPrice(Money),
}

//--------------------------------------   CommissionConfig    -------------------------------------------------------

/// The platform's commission rule, stored as a JSON value in the settings table.
///
/// The wire format is `{"mode": "fixed", "fixed_amount": 500}` or
/// `{"mode": "percentage", "percentage": 8.0, "min_amount": 500}`, amounts in agorot. An unrecognised mode is not an
/// error: it falls back to the percentage formula so that a bad settings write cannot take checkout down. The
/// fallback is logged; it is a compatibility valve, not acceptance of the config as valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCommissionConfig", into = "RawCommissionConfig")]
pub enum CommissionConfig {
    /// A flat fee per order, independent of the asking price.
    Fixed { fixed_amount: Money },
    /// A percentage of the asking price, never less than `min_amount`.
    Percentage { percentage: f64, min_amount: Money },
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self::Percentage {
            percentage: DEFAULT_COMMISSION_PERCENTAGE,
            min_amount: Money::from(DEFAULT_COMMISSION_FLOOR),
        }
    }
}

impl CommissionConfig {
    /// Computes the commission for the given asking price.
    ///
    /// A zero price still yields the fixed amount or the minimum, which is intentional: listing something for free
    /// does not waive the platform fee. A negative price is rejected.
    pub fn fee_for(&self, price_ask: Money) -> Result<Money, PricingError> {
        if price_ask.is_negative() {
            return Err(PricingError::InvalidPrice(price_ask));
        }
        let fee = match self {
            Self::Fixed { fixed_amount } => *fixed_amount,
            Self::Percentage { percentage, min_amount } => {
                // The rate is carried to basis-point precision; finer fractions round half-up once, here.
                let bps = (percentage * 100.0).round() as i64;
                price_ask.percentage_bps(bps).max(*min_amount)
            },
        };
        Ok(fee)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCommissionConfig {
    #[serde(default)]
    mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_amount: Option<Money>,
}

impl RawCommissionConfig {
    fn into_percentage(self) -> CommissionConfig {
        CommissionConfig::Percentage {
            percentage: self.percentage.unwrap_or(DEFAULT_COMMISSION_PERCENTAGE),
            min_amount: self.min_amount.unwrap_or(Money::from(DEFAULT_COMMISSION_FLOOR)),
        }
    }
}

impl From<RawCommissionConfig> for CommissionConfig {
    fn from(raw: RawCommissionConfig) -> Self {
        match raw.mode.as_str() {
            "fixed" => Self::Fixed { fixed_amount: raw.fixed_amount.unwrap_or(Money::from(DEFAULT_COMMISSION_FLOOR)) },
            "percentage" => raw.into_percentage(),
            other => {
                warn!("Unknown commission mode '{other}'. Falling back to the percentage formula");
                raw.into_percentage()
            },
        }
    }
}

impl From<CommissionConfig> for RawCommissionConfig {
    fn from(config: CommissionConfig) -> Self {
        match config {
            CommissionConfig::Fixed { fixed_amount } => Self {
                mode: "fixed".to_string(),
                fixed_amount: Some(fixed_amount),
                percentage: None,
                min_amount: None,
            },
            CommissionConfig::Percentage { percentage, min_amount } => Self {
                mode: "percentage".to_string(),
                fixed_amount: None,
                percentage: Some(percentage),
                min_amount: Some(min_amount),
            },
        }
    }
}

//--------------------------------------    MarketSettings     -------------------------------------------------------

/// The settings snapshot a price quote is computed from. Also the body of the public settings endpoint, so the
/// numbers a buyer sees are by construction the numbers checkout charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSettings {
    pub commission_config: CommissionConfig,
    pub default_shipping_fee: Money,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self { commission_config: CommissionConfig::default(), default_shipping_fee: Money::from(DEFAULT_SHIPPING_FEE) }
    }
}

//--------------------------------------    PriceBreakdown     -------------------------------------------------------

/// The full price of an order: `total = subtotal + fee + shipping_fee`, with `shipping_fee` zero for pickup orders.
/// Constructed only by [`PriceBreakdown::quote`], which keeps the invariant by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub fee: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl PriceBreakdown {
    pub fn quote(price_ask: Money, settings: &MarketSettings, order_type: OrderType) -> Result<Self, PricingError> {
        let fee = settings.commission_config.fee_for(price_ask)?;
        let shipping_fee = match order_type {
            OrderType::Delivery => settings.default_shipping_fee,
            OrderType::Pickup => Money::from(0),
        };
        let total = price_ask + fee + shipping_fee;
        Ok(Self { subtotal: price_ask, fee, shipping_fee, total })
    }
}
