use std::fmt::Debug;

use log::*;

use crate::{
    bpe_api::order_objects::NewItemRequest,
    db_types::{Item, ItemId, ItemStatus, NewItem, Order, OrderId},
    traits::{CatalogApiError, CatalogManagement, MarketplaceDatabase, MarketplaceError},
};

/// The `CatalogApi` serves the item and order listings: seller submissions, buyer-facing queries, and the
/// moderation step that turns a submission into a live listing.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    /// Fetches all orders, newest first.
    pub async fn orders(&self) -> Result<Vec<Order>, CatalogApiError> {
        self.db.fetch_orders().await
    }

    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, CatalogApiError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    /// Fetches all items regardless of status, newest first. This is the moderation view.
    pub async fn items(&self) -> Result<Vec<Item>, CatalogApiError> {
        self.db.fetch_items().await
    }

    pub async fn item_by_id(&self, item_id: &ItemId) -> Result<Option<Item>, CatalogApiError> {
        self.db.fetch_item_by_id(item_id).await
    }

    /// Fetches the approved items only. This is what buyers browse.
    pub async fn approved_items(&self) -> Result<Vec<Item>, CatalogApiError> {
        self.db.fetch_items_by_status(ItemStatus::Approved).await
    }
}

impl<B> CatalogApi<B>
where B: MarketplaceDatabase
{
    /// Takes in a seller's submission. The item lands in `pending_approval` and stays off the public listings
    /// until a moderator approves it.
    pub async fn submit_item(&self, request: NewItemRequest) -> Result<Item, MarketplaceError> {
        request.validate()?;
        let item = NewItem::new(&request.title, request.price_ask)
            .with_description(&request.description)
            .with_seller(&request.seller_name, &request.seller_email, &request.seller_phone);
        let item = self.db.insert_item(item).await?;
        debug!("🛍️️ Item [{}] submitted for approval, asking {}", item.id, item.price_ask);
        Ok(item)
    }

    /// Moderates a pending item. The only permitted verdicts are `approved` and `rejected`.
    ///
    /// Returns `None` when the item is missing or no longer pending, so a double-click on the moderation button
    /// quietly does nothing the second time.
    pub async fn moderate_item(
        &self,
        item_id: &ItemId,
        verdict: ItemStatus,
    ) -> Result<Option<Item>, MarketplaceError> {
        if !matches!(verdict, ItemStatus::Approved | ItemStatus::Rejected) {
            return Err(MarketplaceError::UnsupportedAction(format!("Moderating an item to {verdict}")));
        }
        let updated = self.db.transition_item_status(item_id, ItemStatus::PendingApproval, verdict).await?;
        match &updated {
            Some(item) => info!("🛍️️ Item [{}] moderated to {}", item.id, item.status),
            None => info!("🛍️️ Item [{item_id}] is not awaiting moderation. Verdict ignored"),
        }
        Ok(updated)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
