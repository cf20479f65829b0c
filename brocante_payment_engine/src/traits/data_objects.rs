use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{Item, Order, OrderId};

/// What applying a payment event actually did.
///
/// Payment notifications are delivered at least once and in no guaranteed order, so "nothing happened" outcomes are
/// routine and must stay distinguishable from real work: the caller acknowledges all of these to the upstream
/// processor, but logs them differently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// The order moved to `paid` and the linked item was marked `sold`.
    Fulfilled { order: Order, item: Item },
    /// The order moved to `paid`; the item is untouched because a pickup sale is handed over off-platform.
    PaidNoItemEffect { order: Order },
    /// The order moved to `paid` but the item could not be marked `sold`. The store now holds a paid order that
    /// references an unsold item; manual reconciliation is required.
    ItemNotSold { order: Order },
    /// The order moved to `failed`.
    Failed { order: Order },
    /// The guarded transition did not apply because the order is already in a terminal state. The expected shape of
    /// a replayed or out-of-order event.
    AlreadySettled { order_id: OrderId },
    /// No order with the referenced id exists. Deliberately acknowledged so the processor stops redelivering.
    UnknownOrder { order_id: OrderId },
}

impl PaymentOutcome {
    /// True when the event changed nothing, which the webhook path logs but never reports as a failure.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::AlreadySettled { .. } | Self::UnknownOrder { .. })
    }
}

impl Display for PaymentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fulfilled { order, item } => {
                write!(f, "Order {} paid and item {} sold", order.order_id, item.id)
            },
            Self::PaidNoItemEffect { order } => write!(f, "Pickup order {} paid", order.order_id),
            Self::ItemNotSold { order } => {
                write!(f, "Order {} paid but item {} was NOT marked sold", order.order_id, order.item_id)
            },
            Self::Failed { order } => write!(f, "Order {} marked as failed", order.order_id),
            Self::AlreadySettled { order_id } => write!(f, "Order {order_id} already settled. No action taken"),
            Self::UnknownOrder { order_id } => write!(f, "No order {order_id} exists. No action taken"),
        }
    }
}
