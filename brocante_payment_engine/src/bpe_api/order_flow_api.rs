use std::fmt::Debug;

use log::*;

use crate::{
    bpe_api::{order_objects::NewOrderRequest, settings_api::load_market_settings},
    db_types::{Item, ItemStatus, NewOrder, Order, OrderId, OrderStatus, OrderType},
    pricing::PriceBreakdown,
    traits::{MarketplaceDatabase, MarketplaceError, PaymentOutcome},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: taking in new orders, recording checkout sessions,
/// and applying asynchronous payment events from the hosted payment processor.
///
/// Payment events arrive at least once and in no guaranteed sequence, so every mutation here rides on the guarded
/// transitions of [`MarketplaceDatabase`]. Replays and out-of-order deliveries fall out as no-op
/// [`PaymentOutcome`]s rather than errors.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: MarketplaceDatabase
{
    /// Submit a new order.
    ///
    /// The item must exist and be `approved`. The commission and shipping fee are quoted from the settings that are
    /// live at this moment and frozen onto the order row, so a later settings change never rewrites what a buyer
    /// was quoted.
    pub async fn create_order(&self, request: NewOrderRequest) -> Result<Order, MarketplaceError> {
        request.validate()?;
        let item = self
            .db
            .fetch_item_by_id(&request.item_id)
            .await?
            .ok_or_else(|| MarketplaceError::ItemNotFound(request.item_id.clone()))?;
        if item.status != ItemStatus::Approved {
            return Err(MarketplaceError::ItemNotPurchasable(item.id, item.status));
        }
        let settings = load_market_settings(&self.db).await?;
        let pricing = PriceBreakdown::quote(item.price_ask, &settings, request.order_type)?;
        let order = NewOrder::new(item.id, request.order_type, pricing).with_buyer(
            &request.buyer_first_name,
            &request.buyer_last_name,
            &request.buyer_email,
            &request.buyer_phone,
        );
        let order = self.db.insert_order(order).await?;
        debug!(
            "🔄️📦️ Order [{}] created for item [{}]. {} due via {} order",
            order.order_id, order.item_id, order.total, order.order_type
        );
        Ok(order)
    }

    /// Loads the order and its item ahead of creating a checkout session.
    ///
    /// Only `initiated` orders can be sent to checkout. A paid or failed order is reported as a conflict so the
    /// caller can tell the buyer the order is no longer payable.
    pub async fn checkout_context(&self, order_id: &OrderId) -> Result<(Order, Item), MarketplaceError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| MarketplaceError::OrderNotFound(order_id.clone()))?;
        if order.status != OrderStatus::Initiated {
            return Err(MarketplaceError::InvalidRequest(format!(
                "order {order_id} is no longer payable (status is {})",
                order.status
            )));
        }
        let item = self
            .db
            .fetch_item_by_id(&order.item_id)
            .await?
            .ok_or_else(|| MarketplaceError::ItemNotFound(order.item_id.clone()))?;
        Ok((order, item))
    }

    /// Records the checkout session reference the payment processor handed us for this order.
    ///
    /// A buyer who abandons a session and starts over simply gets the newer reference written over the older one.
    /// Returns `None` when the order settled in the meantime, in which case nothing was recorded.
    pub async fn attach_payment_session(
        &self,
        order_id: &OrderId,
        session_ref: &str,
    ) -> Result<Option<Order>, MarketplaceError> {
        let updated = self.db.update_payment_session(order_id, session_ref).await?;
        match &updated {
            Some(order) => debug!("🔄️💳️ Checkout session [{session_ref}] recorded against order [{}]", order.order_id),
            None => info!("🔄️💳️ Order [{order_id}] settled before session [{session_ref}] could be recorded"),
        }
        Ok(updated)
    }

    /// Applies a successful payment to an order.
    ///
    /// The order is marked paid first. Only when that transition actually applied, and the order is a delivery
    /// order, is the item marked sold. Pickup sales leave the item alone, since the handover happens face to face
    /// and the seller may keep similar listings up.
    ///
    /// A paid order whose item could not be marked sold is a reconciliation problem for a human, not a processing
    /// failure. It is logged loudly and reported as [`PaymentOutcome::ItemNotSold`] so the caller can still
    /// acknowledge the event.
    pub async fn process_payment_succeeded(&self, order_id: &OrderId) -> Result<PaymentOutcome, MarketplaceError> {
        let Some(existing) = self.db.fetch_order_by_order_id(order_id).await? else {
            info!("🔄️✅️ Payment succeeded for unknown order [{order_id}]. Acknowledging without any local effect");
            return Ok(PaymentOutcome::UnknownOrder { order_id: order_id.clone() });
        };
        let Some(order) =
            self.db.transition_order_status(order_id, OrderStatus::Initiated, OrderStatus::Paid).await?
        else {
            info!(
                "🔄️✅️ Order [{order_id}] is already settled (status is {}). Payment event ignored",
                existing.status
            );
            return Ok(PaymentOutcome::AlreadySettled { order_id: order_id.clone() });
        };
        info!("🔄️✅️ Order [{}] is paid. {} received", order.order_id, order.total);
        if order.order_type != OrderType::Delivery {
            debug!(
                "🔄️✅️ Order [{}] is a {} order, so item [{}] keeps its listing status",
                order.order_id, order.order_type, order.item_id
            );
            return Ok(PaymentOutcome::PaidNoItemEffect { order });
        }
        match self.db.transition_item_status(&order.item_id, ItemStatus::Approved, ItemStatus::Sold).await {
            Ok(Some(item)) => {
                info!("🔄️✅️ Item [{}] is sold and off the listings", item.id);
                Ok(PaymentOutcome::Fulfilled { order, item })
            },
            Ok(None) => {
                error!(
                    "🔄️🚨️ Order [{}] is paid, but item [{}] was not in an approved state and could not be marked \
                     sold. Reconcile this order manually",
                    order.order_id, order.item_id
                );
                Ok(PaymentOutcome::ItemNotSold { order })
            },
            Err(e) => {
                error!(
                    "🔄️🚨️ Order [{}] is paid, but marking item [{}] as sold failed: {e}. Reconcile this order \
                     manually",
                    order.order_id, order.item_id
                );
                Ok(PaymentOutcome::ItemNotSold { order })
            },
        }
    }

    /// Applies an expired or failed payment to an order.
    ///
    /// Items are never touched here. A listing stays live when a buyer's payment falls through, so the next buyer
    /// can pick it up.
    pub async fn process_payment_failed(&self, order_id: &OrderId) -> Result<PaymentOutcome, MarketplaceError> {
        let Some(existing) = self.db.fetch_order_by_order_id(order_id).await? else {
            info!("🔄️❌️ Payment failed for unknown order [{order_id}]. Acknowledging without any local effect");
            return Ok(PaymentOutcome::UnknownOrder { order_id: order_id.clone() });
        };
        let Some(order) =
            self.db.transition_order_status(order_id, OrderStatus::Initiated, OrderStatus::Failed).await?
        else {
            info!(
                "🔄️❌️ Order [{order_id}] is already settled (status is {}). Payment event ignored",
                existing.status
            );
            return Ok(PaymentOutcome::AlreadySettled { order_id: order_id.clone() });
        };
        info!("🔄️❌️ Order [{}] is marked as failed. Item [{}] stays listed", order.order_id, order.item_id);
        Ok(PaymentOutcome::Failed { order })
    }

    /// Returns a reference to the underlying database so that callers can reach queries not exposed here.
    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
