use thiserror::Error;

use crate::{
    db_types::{Item, ItemId, ItemStatus, NewItem, NewOrder, Order, OrderId, OrderStatus},
    pricing::PricingError,
    traits::{CatalogApiError, CatalogManagement, SettingsApiError, SettingsManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the Brocante payment engine.
///
/// This behaviour includes:
/// * Storing new items and orders.
/// * The guarded status transitions that implement the order and item state machines.
/// * Recording the checkout session reference on an order.
///
/// The guarded transition methods return `Ok(None)` when the precondition did not hold. That outcome is not an
/// error: it is how an idempotent replay or an out-of-order event reports itself. Callers inspect it before
/// cascading any dependent effect.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + CatalogManagement + SettingsManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new item with status `pending_approval`, returning the stored record.
    async fn insert_item(&self, item: NewItem) -> Result<Item, MarketplaceError>;

    /// Stores a new order with status `initiated`, returning the stored record.
    ///
    /// The order id must be fresh. An existing order with the same id is an error, never a silent overwrite.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, MarketplaceError>;

    /// Sets `order.status = to` if and only if the status currently equals `from`, in one atomic update.
    ///
    /// Returns the updated order if the transition applied, and `None` if the guard failed (the order does not
    /// exist, or is not in the expected state).
    async fn transition_order_status(
        &self,
        order_id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, MarketplaceError>;

    /// Sets `item.status = to` if and only if the status currently equals `from`, in one atomic update.
    ///
    /// Returns the updated item if the transition applied, and `None` if the guard failed.
    async fn transition_item_status(
        &self,
        item_id: &ItemId,
        from: ItemStatus,
        to: ItemStatus,
    ) -> Result<Option<Item>, MarketplaceError>;

    /// Records the opaque checkout session reference on an order, overwriting any previous reference.
    ///
    /// Only `initiated` orders can take a session reference (at most one session is meaningful per order, and an
    /// order that has reached a terminal state must not resurrect one). Returns `None` if the order is missing or
    /// no longer `initiated`.
    async fn update_payment_session(
        &self,
        order_id: &OrderId,
        session_ref: &str,
    ) -> Result<Option<Order>, MarketplaceError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), MarketplaceError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The requested item {0} does not exist")]
    ItemNotFound(ItemId),
    #[error("Item {0} is not open for purchase (status is {1})")]
    ItemNotPurchasable(ItemId, ItemStatus),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    PricingError(#[from] PricingError),
    #[error("{0}")]
    CatalogError(#[from] CatalogApiError),
    #[error("{0}")]
    SettingsError(#[from] SettingsApiError),
    #[error("{0} is not supported")]
    UnsupportedAction(String),
}

impl From<sqlx::Error> for MarketplaceError {
    fn from(e: sqlx::Error) -> Self {
        MarketplaceError::DatabaseError(e.to_string())
    }
}
