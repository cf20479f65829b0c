use std::fmt::Debug;

use bpg_common::Money;
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::SettingsEntry,
    pricing::{CommissionConfig, MarketSettings, DEFAULT_SHIPPING_FEE},
    traits::{SettingsApiError, SettingsManagement},
};

/// The settings key holding the serialized [`CommissionConfig`].
pub const COMMISSION_CONFIG_KEY: &str = "commission_config";
/// The settings key holding the default shipping fee, in agorot.
pub const DEFAULT_SHIPPING_FEE_KEY: &str = "default_shipping_fee";

/// A settings row with its value parsed into JSON, which is how the admin UI wants to see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl From<SettingsEntry> for SettingsView {
    fn from(entry: SettingsEntry) -> Self {
        let value = serde_json::from_str(&entry.value).unwrap_or_else(|e| {
            warn!("🪛️ Stored setting [{}] is not valid JSON ({e}). Passing it through as a string", entry.key);
            serde_json::Value::String(entry.value.clone())
        });
        Self { key: entry.key, value, updated_at: entry.updated_at }
    }
}

/// `SettingsApi` reads and writes the shared marketplace settings.
///
/// Reads are forgiving. A missing or unreadable stored value falls back to the compiled-in defaults, so a fresh
/// database serves quotes from minute one. Writes are strict and reject values that would poison later reads.
pub struct SettingsApi<B> {
    db: B,
}

impl<B> Debug for SettingsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettingsApi")
    }
}

impl<B> SettingsApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> SettingsApi<B>
where B: SettingsManagement
{
    /// The effective marketplace settings: stored values where they exist and parse, defaults otherwise.
    pub async fn market_settings(&self) -> Result<MarketSettings, SettingsApiError> {
        load_market_settings(&self.db).await
    }

    /// All stored settings rows, for the admin settings screen.
    pub async fn all(&self) -> Result<Vec<SettingsView>, SettingsApiError> {
        let entries = self.db.fetch_all_settings().await?;
        Ok(entries.into_iter().map(SettingsView::from).collect())
    }

    /// Replaces the commission rule. The config is re-serialized from its parsed form, so whatever aliases or
    /// unknown modes came in over the wire are stored normalized.
    pub async fn set_commission_config(&self, config: CommissionConfig) -> Result<SettingsEntry, SettingsApiError> {
        let value = serde_json::to_string(&config)
            .map_err(|e| SettingsApiError::InvalidValue(format!("commission config does not serialize: {e}")))?;
        let entry = self.db.upsert_setting(COMMISSION_CONFIG_KEY, &value).await?;
        info!("🪛️ Commission config updated to {value}");
        Ok(entry)
    }

    /// Replaces the default shipping fee. Negative fees are refused.
    pub async fn set_default_shipping_fee(&self, fee: Money) -> Result<SettingsEntry, SettingsApiError> {
        if fee.is_negative() {
            return Err(SettingsApiError::InvalidValue(format!("shipping fee may not be negative ({fee})")));
        }
        let value = fee.value().to_string();
        let entry = self.db.upsert_setting(DEFAULT_SHIPPING_FEE_KEY, &value).await?;
        info!("🪛️ Default shipping fee updated to {fee}");
        Ok(entry)
    }

    /// Stores an arbitrary settings key. The two well-known keys have dedicated setters that validate their shape;
    /// this one only requires the value to be JSON so that reads stay parseable.
    pub async fn set_raw(&self, key: &str, value: &serde_json::Value) -> Result<SettingsEntry, SettingsApiError> {
        let value = serde_json::to_string(value)
            .map_err(|e| SettingsApiError::InvalidValue(format!("setting does not serialize: {e}")))?;
        let entry = self.db.upsert_setting(key, &value).await?;
        info!("🪛️ Setting [{key}] updated");
        Ok(entry)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

/// Loads the effective [`MarketSettings`] straight off a backend. [`crate::OrderFlowApi`] quotes with this at order
/// intake, without having to own a second API object.
pub(crate) async fn load_market_settings<B: SettingsManagement>(db: &B) -> Result<MarketSettings, SettingsApiError> {
    let commission_config = match db.fetch_setting(COMMISSION_CONFIG_KEY).await? {
        Some(raw) => serde_json::from_str::<CommissionConfig>(&raw).unwrap_or_else(|e| {
            warn!("🪛️ Stored commission config is unreadable ({e}). Quoting with the default rule");
            CommissionConfig::default()
        }),
        None => CommissionConfig::default(),
    };
    let default_shipping_fee = match db.fetch_setting(DEFAULT_SHIPPING_FEE_KEY).await? {
        Some(raw) => raw.trim().parse::<i64>().map(Money::from).unwrap_or_else(|e| {
            warn!("🪛️ Stored shipping fee [{raw}] is not a whole number of agorot ({e}). Using the default");
            Money::from(DEFAULT_SHIPPING_FEE)
        }),
        None => Money::from(DEFAULT_SHIPPING_FEE),
    };
    Ok(MarketSettings { commission_config, default_shipping_fee })
}
