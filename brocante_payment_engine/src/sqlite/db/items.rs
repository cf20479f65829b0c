use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Item, ItemId, ItemStatus, NewItem};

/// Inserts a new item using the given connection. New items always start out `pending_approval`; the schema default
/// takes care of that, so the status column is not named here.
pub async fn insert_item(item: NewItem, conn: &mut SqliteConnection) -> Result<Item, sqlx::Error> {
    let item: Item = sqlx::query_as(
        r#"
            INSERT INTO items (
                id,
                title,
                description,
                price_ask,
                seller_name,
                seller_email,
                seller_phone
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(item.id)
    .bind(item.title)
    .bind(item.description)
    .bind(item.price_ask.value())
    .bind(item.seller_name)
    .bind(item.seller_email)
    .bind(item.seller_phone)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Item [{}] inserted as {}", item.id, item.status);
    Ok(item)
}

pub async fn fetch_item_by_id(item_id: &ItemId, conn: &mut SqliteConnection) -> Result<Option<Item>, sqlx::Error> {
    let item = sqlx::query_as("SELECT * FROM items WHERE id = $1").bind(item_id.as_str()).fetch_optional(conn).await?;
    Ok(item)
}

/// Fetches every item regardless of status, newest first.
pub async fn fetch_all_items(conn: &mut SqliteConnection) -> Result<Vec<Item>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM items ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(items)
}

/// Fetches the items in the given status, newest first.
pub async fn fetch_items_by_status(
    status: ItemStatus,
    conn: &mut SqliteConnection,
) -> Result<Vec<Item>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM items WHERE status = $1 ORDER BY created_at DESC, id DESC")
        .bind(status.to_string())
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// The guarded status transition behind the item state machine, same shape as the one for orders. `None` means the
/// guard failed and nothing was written.
pub(crate) async fn update_item_status(
    item_id: &ItemId,
    from: ItemStatus,
    to: ItemStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Item>, sqlx::Error> {
    let result: Option<Item> = sqlx::query_as(
        "UPDATE items SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(to.to_string())
    .bind(item_id.as_str())
    .bind(from.to_string())
    .fetch_optional(conn)
    .await?;
    if let Some(item) = &result {
        debug!("📝️ Item [{}] moved from {from} to {to}", item.id);
    }
    Ok(result)
}
