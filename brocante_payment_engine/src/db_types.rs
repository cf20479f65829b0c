use std::{fmt::Display, str::FromStr};

use bpg_common::Money;
use chrono::{DateTime, Utc};
use log::error;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::pricing::PriceBreakdown;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

fn random_suffix() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(20).map(char::from).collect::<String>().to_lowercase()
}

//--------------------------------------        OrderId        -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generates a fresh order id. Ids are opaque; nothing may parse meaning out of them.
    pub fn random() -> Self {
        Self(format!("ord-{}", random_suffix()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        ItemId         -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn random() -> Self {
        Self(format!("itm-{}", random_suffix()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------      OrderStatus      -------------------------------------------------------

/// The order lifecycle. `Initiated` is the only non-terminal state; once an order is `Paid` or `Failed` no edge
/// leads back out. The payment event processor is the sole writer of these transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// The order has been created; no payment outcome has been recorded yet.
    Initiated,
    /// Payment completed successfully. Terminal.
    Paid,
    /// Payment failed or the checkout session expired. Terminal.
    Failed,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Initiated => write!(f, "initiated"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(Self::Initiated),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to initiated");
            OrderStatus::Initiated
        })
    }
}

//--------------------------------------      ItemStatus       -------------------------------------------------------

/// The sale-relevant item lifecycle. Moderation moves a listing from `PendingApproval` to `Approved` or `Rejected`;
/// only the payment event processor moves an `Approved` item to `Sold`, and it does so at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    PendingApproval,
    Approved,
    Rejected,
    Sold,
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::PendingApproval => write!(f, "pending_approval"),
            ItemStatus::Approved => write!(f, "approved"),
            ItemStatus::Rejected => write!(f, "rejected"),
            ItemStatus::Sold => write!(f, "sold"),
        }
    }
}

impl FromStr for ItemStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "sold" => Ok(Self::Sold),
            s => Err(ConversionError(format!("Invalid item status: {s}"))),
        }
    }
}

impl From<String> for ItemStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid item status: {value}. But this conversion cannot fail. Defaulting to pending_approval");
            ItemStatus::PendingApproval
        })
    }
}

//--------------------------------------       OrderType       -------------------------------------------------------

/// How the buyer receives the goods. Delivery orders carry a shipping fee and are the only orders whose successful
/// payment marks the item sold; pickup is settled off-platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Delivery,
    Pickup,
}

impl Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Delivery => write!(f, "delivery"),
            OrderType::Pickup => write!(f, "pickup"),
        }
    }
}

impl FromStr for OrderType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery" => Ok(Self::Delivery),
            "pickup" => Ok(Self::Pickup),
            s => Err(ConversionError(format!("Invalid order type: {s}"))),
        }
    }
}

//--------------------------------------        Order          -------------------------------------------------------

/// A single purchase attempt. The price breakdown is snapshotted at creation and never recomputed; only `status`
/// and `payment_session_ref` ever change, and orders are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub buyer_first_name: String,
    pub buyer_last_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    pub order_type: OrderType,
    pub subtotal: Money,
    pub fee: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_session_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub buyer_first_name: String,
    pub buyer_last_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    pub order_type: OrderType,
    pub subtotal: Money,
    pub fee: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl NewOrder {
    pub fn new(item_id: ItemId, order_type: OrderType, pricing: PriceBreakdown) -> Self {
        Self {
            order_id: OrderId::random(),
            item_id,
            buyer_first_name: String::new(),
            buyer_last_name: String::new(),
            buyer_email: String::new(),
            buyer_phone: String::new(),
            order_type,
            subtotal: pricing.subtotal,
            fee: pricing.fee,
            shipping_fee: pricing.shipping_fee,
            total: pricing.total,
        }
    }

    pub fn with_buyer(mut self, first_name: &str, last_name: &str, email: &str, phone: &str) -> Self {
        self.buyer_first_name = first_name.to_string();
        self.buyer_last_name = last_name.to_string();
        self.buyer_email = email.to_string();
        self.buyer_phone = phone.to_string();
        self
    }
}

//--------------------------------------         Item          -------------------------------------------------------

/// A listed good. Sellers submit items, moderation approves or rejects them, and a successful delivery payment
/// marks the item sold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub price_ask: Money,
    pub status: ItemStatus,
    pub seller_name: String,
    pub seller_email: String,
    pub seller_phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewItem         -------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewItem {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub price_ask: Money,
    pub seller_name: String,
    pub seller_email: String,
    pub seller_phone: String,
}

impl NewItem {
    pub fn new(title: &str, price_ask: Money) -> Self {
        Self {
            id: ItemId::random(),
            title: title.to_string(),
            description: String::new(),
            price_ask,
            seller_name: String::new(),
            seller_email: String::new(),
            seller_phone: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_seller(mut self, name: &str, email: &str, phone: &str) -> Self {
        self.seller_name = name.to_string();
        self.seller_email = email.to_string();
        self.seller_phone = phone.to_string();
        self
    }
}

//--------------------------------------     SettingsEntry     -------------------------------------------------------

/// One row of the key/value settings store. `value` holds raw JSON text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SettingsEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
