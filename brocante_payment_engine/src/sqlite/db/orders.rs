use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    traits::MarketplaceError,
};

/// Inserts a new order using the given connection. This is not atomic. You can embed this call inside a transaction
/// if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// Order ids carry the pricing contract with the buyer, so an id that already exists is an error rather than an
/// upsert.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, MarketplaceError> {
    if fetch_order_by_order_id(&order.order_id, conn).await?.is_some() {
        return Err(MarketplaceError::OrderAlreadyExists(order.order_id));
    }
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                item_id,
                buyer_first_name,
                buyer_last_name,
                buyer_email,
                buyer_phone,
                order_type,
                subtotal,
                fee,
                shipping_fee,
                total
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.item_id)
    .bind(order.buyer_first_name)
    .bind(order.buyer_last_name)
    .bind(order.buyer_email)
    .bind(order.buyer_phone)
    .bind(order.order_type.to_string())
    .bind(order.subtotal.value())
    .bind(order.fee.value())
    .bind(order.shipping_fee.value())
    .bind(order.total.value())
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches every order, newest first.
pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(orders)
}

/// The guarded status transition behind the order state machine. The `WHERE` clause carries both the order id and
/// the expected current status, so the update is a single atomic compare-and-set. `None` means the guard failed and
/// nothing was written.
pub(crate) async fn update_order_status(
    order_id: &OrderId,
    from: OrderStatus,
    to: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND status = $3 \
         RETURNING *",
    )
    .bind(to.to_string())
    .bind(order_id.as_str())
    .bind(from.to_string())
    .fetch_optional(conn)
    .await?;
    if let Some(order) = &result {
        debug!("📝️ Order [{}] moved from {from} to {to}", order.order_id);
    }
    Ok(result)
}

/// Records the checkout session reference against the order, replacing any earlier reference. Only `initiated`
/// orders qualify; the same guarded-update shape as the status transitions keeps the write atomic.
pub(crate) async fn update_payment_session(
    order_id: &OrderId,
    session_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_session_ref = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND status \
         = $3 RETURNING *",
    )
    .bind(session_ref)
    .bind(order_id.as_str())
    .bind(OrderStatus::Initiated.to_string())
    .fetch_optional(conn)
    .await?;
    Ok(result)
}
