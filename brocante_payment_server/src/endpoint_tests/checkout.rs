use actix_web::{http::StatusCode, web, web::ServiceConfig};
use brocante_payment_engine::{
    db_types::{ItemStatus, OrderStatus},
    OrderFlowApi,
};
use hosted_checkout::{CheckoutApi, CheckoutConfig};

use super::{
    helpers::{get_request, item_fixture, order_fixture},
    mocks::MockMarketplace,
};
use crate::routes::CheckoutRoute;

/// A client pointed at a port nothing listens on. Any session create attempt fails at connect time.
fn dead_processor() -> CheckoutApi {
    CheckoutApi::new(CheckoutConfig::new("http://127.0.0.1:1", "sk_test_000")).expect("checkout client")
}

fn configure_unknown_order(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    cfg.service(CheckoutRoute::<MockMarketplace>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(dead_processor()));
}

fn configure_settled_order(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order_fixture(OrderStatus::Paid))));
    cfg.service(CheckoutRoute::<MockMarketplace>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(dead_processor()));
}

fn configure_payable_order(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order_fixture(OrderStatus::Initiated))));
    db.expect_fetch_item_by_id().returning(|_| Ok(Some(item_fixture(ItemStatus::Approved))));
    cfg.service(CheckoutRoute::<MockMarketplace>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(dead_processor()));
}

#[actix_web::test]
async fn checkout_for_an_unknown_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/checkout?order_id=ord-4040", configure_unknown_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("ord-4040"), "got: {body}");
}

#[actix_web::test]
async fn a_settled_order_cannot_go_back_to_checkout() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/checkout?order_id=ord-1001", configure_settled_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("no longer payable"), "got: {body}");
    assert!(body.contains("paid"), "got: {body}");
}

#[actix_web::test]
async fn an_unreachable_processor_is_a_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/checkout?order_id=ord-1001", configure_payable_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("payment processor could not be reached"), "got: {body}");
}
