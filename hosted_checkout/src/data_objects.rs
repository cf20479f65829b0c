use std::fmt::Display;

use bpg_common::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for creating a hosted checkout session. Always a single line item, priced in integer minor units
/// of the given currency.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionRequest {
    pub mode: String,
    pub currency: String,
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: EventMetadata,
}

impl CheckoutSessionRequest {
    pub fn single_item(
        currency: &str,
        item: CheckoutLineItem,
        success_url: String,
        cancel_url: String,
        order_id: String,
    ) -> Self {
        Self {
            mode: "payment".to_string(),
            currency: currency.to_string(),
            line_items: vec![item],
            success_url,
            cancel_url,
            metadata: EventMetadata { order_id: Some(order_id) },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutLineItem {
    pub name: String,
    pub description: String,
    pub unit_amount: Money,
    pub quantity: u32,
}

/// The processor's view of a hosted session: an opaque id plus the URL of the hosted payment page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// An asynchronous payment notification, as delivered to the webhook endpoint.
///
/// Only the fields this system acts on are modelled. `data.object.metadata.order_id` is the sole link back to an
/// order; amounts in the payload are never trusted or even read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: PaymentEventType,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    pub data: EventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub object: EventObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventObject {
    pub id: String,
    #[serde(default)]
    pub metadata: EventMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default)]
    pub order_id: Option<String>,
}

impl PaymentEvent {
    pub fn order_id(&self) -> Option<&str> {
        self.data.object.metadata.order_id.as_deref()
    }
}

/// Event types the processor emits. Anything unrecognised lands in `Other` so that new event types are
/// acknowledged rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentEventType {
    CheckoutSessionCompleted,
    CheckoutSessionExpired,
    PaymentFailed,
    Other(String),
}

impl From<String> for PaymentEventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.expired" => Self::CheckoutSessionExpired,
            "payment_intent.payment_failed" => Self::PaymentFailed,
            _ => Self::Other(value),
        }
    }
}

impl From<PaymentEventType> for String {
    fn from(value: PaymentEventType) -> Self {
        value.to_string()
    }
}

impl Display for PaymentEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheckoutSessionCompleted => write!(f, "checkout.session.completed"),
            Self::CheckoutSessionExpired => write!(f, "checkout.session.expired"),
            Self::PaymentFailed => write!(f, "payment_intent.payment_failed"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}
