use bpg_common::Money;
use brocante_payment_engine::{
    db_types::{Item, ItemId, ItemStatus, OrderType},
    order_objects::{NewItemRequest, NewOrderRequest},
    CatalogApi,
    SqliteDatabase,
};

use super::prepare_env::{prepare_test_env, random_db_path};

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to test database")
}

pub fn item_request(title: &str, price_ask: i64) -> NewItemRequest {
    NewItemRequest {
        title: title.to_string(),
        description: "Good condition, minor scratches".to_string(),
        price_ask: Money::from(price_ask),
        seller_name: "Rivka Hazan".to_string(),
        seller_email: "rivka@example.com".to_string(),
        seller_phone: "03-5551234".to_string(),
    }
}

/// Submits an item and walks it through moderation so that it is purchasable.
pub async fn approved_item(db: &SqliteDatabase, title: &str, price_ask: i64) -> Item {
    let catalog = CatalogApi::new(db.clone());
    let item = catalog.submit_item(item_request(title, price_ask)).await.expect("Error submitting item");
    catalog
        .moderate_item(&item.id, ItemStatus::Approved)
        .await
        .expect("Error approving item")
        .expect("Item was not pending approval")
}

pub fn order_request(item_id: &ItemId, order_type: OrderType) -> NewOrderRequest {
    NewOrderRequest {
        item_id: item_id.clone(),
        buyer_first_name: "Noa".to_string(),
        buyer_last_name: "Peretz".to_string(),
        buyer_email: "noa@example.com".to_string(),
        buyer_phone: "050-1234567".to_string(),
        order_type,
    }
}
