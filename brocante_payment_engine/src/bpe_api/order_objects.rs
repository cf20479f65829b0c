use bpg_common::Money;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{ItemId, OrderType},
    traits::MarketplaceError,
};

/// The payload a buyer submits to place an order for a single item.
///
/// The order id, the price breakdown and the initial status are all assigned by the engine. Clients only say *what*
/// they are buying, *who* they are, and *how* the item should reach them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub item_id: ItemId,
    pub buyer_first_name: String,
    pub buyer_last_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    pub order_type: OrderType,
}

impl NewOrderRequest {
    /// Checks that every required buyer field is present. The item itself is validated against the catalog later,
    /// since that requires a database lookup.
    pub fn validate(&self) -> Result<(), MarketplaceError> {
        let missing = [
            ("buyer_first_name", &self.buyer_first_name),
            ("buyer_last_name", &self.buyer_last_name),
            ("buyer_email", &self.buyer_email),
            ("buyer_phone", &self.buyer_phone),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect::<Vec<&str>>();
        if self.item_id.as_str().trim().is_empty() {
            return Err(MarketplaceError::InvalidRequest("item_id must not be empty".to_string()));
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MarketplaceError::InvalidRequest(format!("missing required fields: {}", missing.join(", "))))
        }
    }
}

/// The payload a seller submits to offer an item for sale. The item starts out `pending_approval` and only becomes
/// visible to buyers once a moderator approves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price_ask: Money,
    pub seller_name: String,
    pub seller_email: String,
    pub seller_phone: String,
}

impl NewItemRequest {
    pub fn validate(&self) -> Result<(), MarketplaceError> {
        let missing = [
            ("title", &self.title),
            ("seller_name", &self.seller_name),
            ("seller_email", &self.seller_email),
            ("seller_phone", &self.seller_phone),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect::<Vec<&str>>();
        if !missing.is_empty() {
            return Err(MarketplaceError::InvalidRequest(format!("missing required fields: {}", missing.join(", "))));
        }
        if self.price_ask.is_negative() {
            let msg = format!("asking price may not be negative ({})", self.price_ask);
            return Err(MarketplaceError::InvalidRequest(msg));
        }
        Ok(())
    }
}
