use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bpg_common::Money;
use brocante_payment_engine::{
    db_types::{Item, ItemId, ItemStatus, Order, OrderStatus, OrderType},
    order_objects::{NewItemRequest, NewOrderRequest},
    CatalogApi,
    OrderFlowApi,
};

use super::{
    helpers::{admin_tokens, get_request, item_fixture, item_from_new, order_fixture, order_from_new, patch_request, post_request},
    mocks::MockMarketplace,
};
use crate::{
    data_objects::ModerationRequest,
    routes::{AdminOrdersRoute, ListItemsRoute, ModerateItemRoute, NewItemRoute, NewOrderRoute},
};

fn order_request() -> NewOrderRequest {
    NewOrderRequest {
        item_id: ItemId::from("itm-aaaaaaaaaaaaaaaaaaaa".to_string()),
        buyer_first_name: "Noa".to_string(),
        buyer_last_name: "Peretz".to_string(),
        buyer_email: "noa@example.com".to_string(),
        buyer_phone: "052-5550199".to_string(),
        order_type: OrderType::Delivery,
    }
}

fn item_request() -> NewItemRequest {
    NewItemRequest {
        title: "Bentwood rocking chair".to_string(),
        description: "Cane seat redone last year".to_string(),
        price_ask: Money::from(45_000),
        seller_name: "Avi Mizrahi".to_string(),
        seller_email: "avi@example.com".to_string(),
        seller_phone: "054-5550110".to_string(),
    }
}

/// Order intake against an approved item, with no stored settings so the compiled-in defaults price the order.
fn configure_order_intake(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_item_by_id().returning(|id| {
        let mut item = item_fixture(ItemStatus::Approved);
        item.id = id.clone();
        Ok(Some(item))
    });
    db.expect_fetch_setting().returning(|_| Ok(None));
    db.expect_insert_order().returning(|order| Ok(order_from_new(order)));
    cfg.service(NewOrderRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_unknown_item(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_item_by_id().returning(|_| Ok(None));
    cfg.service(NewOrderRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_pending_item(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_item_by_id().returning(|_| Ok(Some(item_fixture(ItemStatus::PendingApproval))));
    cfg.service(NewOrderRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_catalog(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_items_by_status()
        .withf(|status| *status == ItemStatus::Approved)
        .returning(|_| Ok(vec![item_fixture(ItemStatus::Approved)]));
    db.expect_insert_item().returning(|item| Ok(item_from_new(item)));
    cfg.service(ListItemsRoute::<MockMarketplace>::new())
        .service(NewItemRoute::<MockMarketplace>::new())
        .app_data(web::Data::new(CatalogApi::new(db)));
}

fn configure_order_overview(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_orders()
        .returning(|| Ok(vec![order_fixture(OrderStatus::Paid), order_fixture(OrderStatus::Initiated)]));
    cfg.service(AdminOrdersRoute::<MockMarketplace>::new()).app_data(web::Data::new(CatalogApi::new(db)));
}

fn configure_moderation(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_transition_item_status()
        .withf(|_, from, to| *from == ItemStatus::PendingApproval && *to == ItemStatus::Approved)
        .returning(|id, _, to| {
            let mut item = item_fixture(to);
            item.id = id.clone();
            Ok(Some(item))
        });
    cfg.service(ModerateItemRoute::<MockMarketplace>::new()).app_data(web::Data::new(CatalogApi::new(db)));
}

fn configure_moderation_noop(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_transition_item_status().returning(|_, _, _| Ok(None));
    cfg.service(ModerateItemRoute::<MockMarketplace>::new()).app_data(web::Data::new(CatalogApi::new(db)));
}

#[actix_web::test]
async fn a_delivery_order_is_created_with_the_full_price_breakdown() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("", "/orders", &order_request(), configure_order_intake).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let order = serde_json::from_str::<Order>(&body).expect("response is not an order");
    assert_eq!(order.status, OrderStatus::Initiated);
    assert_eq!(order.item_id, order_request().item_id);
    // Defaults: 8% of ₪200.00 commission, ₪35.00 shipping
    assert_eq!(order.subtotal, Money::from(20_000));
    assert_eq!(order.fee, Money::from(1_600));
    assert_eq!(order.shipping_fee, Money::from(3_500));
    assert_eq!(order.total, Money::from(25_100));
    assert!(order.order_id.as_str().starts_with("ord-"), "got order id {}", order.order_id);
}

#[actix_web::test]
async fn a_pickup_order_carries_no_shipping_fee() {
    let _ = env_logger::try_init().ok();
    let mut request = order_request();
    request.order_type = OrderType::Pickup;
    let (status, body) = post_request("", "/orders", &request, configure_order_intake).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let order = serde_json::from_str::<Order>(&body).expect("response is not an order");
    assert_eq!(order.shipping_fee, Money::from(0));
    assert_eq!(order.total, Money::from(21_600));
}

#[actix_web::test]
async fn ordering_an_unknown_item_is_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("", "/orders", &order_request(), configure_unknown_item).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("itm-aaaaaaaaaaaaaaaaaaaa"), "got: {body}");
}

#[actix_web::test]
async fn blank_buyer_fields_are_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut request = order_request();
    request.buyer_email = "   ".to_string();
    request.buyer_phone = String::new();
    let (status, body) = post_request("", "/orders", &request, configure_order_intake).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("buyer_email, buyer_phone"), "got: {body}");
}

#[actix_web::test]
async fn only_approved_items_can_be_ordered() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("", "/orders", &order_request(), configure_pending_item).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("pending_approval"), "got: {body}");
}

#[actix_web::test]
async fn a_submitted_item_waits_for_moderation() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("", "/items", &item_request(), configure_catalog).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let item = serde_json::from_str::<Item>(&body).expect("response is not an item");
    assert_eq!(item.status, ItemStatus::PendingApproval);
    assert_eq!(item.title, "Bentwood rocking chair");
    assert!(item.id.as_str().starts_with("itm-"), "got item id {}", item.id);
}

#[actix_web::test]
async fn the_public_catalog_asks_for_approved_items_only() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/items", configure_catalog).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let items = serde_json::from_str::<Vec<Item>>(&body).expect("response is not an item list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Teak sideboard");
}

#[actix_web::test]
async fn the_admin_overview_lists_every_order() {
    let _ = env_logger::try_init().ok();
    let token = admin_tokens().issue_token();
    let (status, body) = get_request(&token, "/admin/orders", configure_order_overview).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders = serde_json::from_str::<Vec<Order>>(&body).expect("response is not an order list");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].status, OrderStatus::Paid);
}

#[actix_web::test]
async fn approving_a_pending_item_publishes_it() {
    let _ = env_logger::try_init().ok();
    let token = admin_tokens().issue_token();
    let request =
        ModerationRequest { item_id: ItemId::from("itm-aaaaaaaaaaaaaaaaaaaa".to_string()), status: ItemStatus::Approved };
    let (status, body) = patch_request(&token, "/admin/items", &request, configure_moderation).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let item = serde_json::from_str::<Item>(&body).expect("response is not an item");
    assert_eq!(item.status, ItemStatus::Approved);
}

#[actix_web::test]
async fn sold_is_not_a_moderation_verdict() {
    let _ = env_logger::try_init().ok();
    let token = admin_tokens().issue_token();
    let request =
        ModerationRequest { item_id: ItemId::from("itm-aaaaaaaaaaaaaaaaaaaa".to_string()), status: ItemStatus::Sold };
    let (status, body) = patch_request(&token, "/admin/items", &request, configure_moderation_noop).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Moderating an item to sold"), "got: {body}");
}

#[actix_web::test]
async fn moderating_a_settled_item_changes_nothing() {
    let _ = env_logger::try_init().ok();
    let token = admin_tokens().issue_token();
    let request =
        ModerationRequest { item_id: ItemId::from("itm-aaaaaaaaaaaaaaaaaaaa".to_string()), status: ItemStatus::Rejected };
    let (status, body) = patch_request(&token, "/admin/items", &request, configure_moderation_noop).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":false"#), "got: {body}");
    assert!(body.contains("not awaiting moderation"), "got: {body}");
}
