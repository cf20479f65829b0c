use thiserror::Error;

use crate::db_types::{Item, ItemId, ItemStatus, Order, OrderId};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

/// Read-only queries over the marketplace catalog: orders and items.
///
/// The mutating counterparts live on [`super::MarketplaceDatabase`]; keeping the queries separate lets listing
/// surfaces run against a backend that can never write.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the order with the given order id, or `None` if it does not exist.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, CatalogApiError>;

    /// Fetches the item with the given id, or `None` if it does not exist.
    async fn fetch_item_by_id(&self, item_id: &ItemId) -> Result<Option<Item>, CatalogApiError>;

    /// All orders, newest first.
    async fn fetch_orders(&self) -> Result<Vec<Order>, CatalogApiError>;

    /// All items, newest first.
    async fn fetch_items(&self) -> Result<Vec<Item>, CatalogApiError>;

    /// Items in the given status, newest first.
    async fn fetch_items_by_status(&self, status: ItemStatus) -> Result<Vec<Item>, CatalogApiError>;
}
