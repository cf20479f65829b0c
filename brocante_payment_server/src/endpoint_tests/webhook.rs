use actix_web::{
    body::MessageBody,
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use bpg_common::Secret;
use brocante_payment_engine::{
    db_types::{ItemStatus, OrderStatus},
    traits::MarketplaceError,
    OrderFlowApi,
};

use super::{
    helpers::{item_fixture, order_fixture, server_options, TEST_WEBHOOK_SECRET},
    mocks::MockMarketplace,
};
use crate::{
    helpers::calculate_hmac,
    middleware::{HmacMiddlewareFactory, PAYMENT_SIGNATURE_HEADER},
    webhook_routes::PaymentWebhookRoute,
};

fn completed_event(order_id: &str) -> String {
    format!(
        r#"{{"id":"evt_1","type":"checkout.session.completed","created":1726300000,"data":{{"object":{{"id":"cs_live_42","metadata":{{"order_id":"{order_id}"}}}}}}}}"#
    )
}

fn expired_event(order_id: &str) -> String {
    format!(
        r#"{{"id":"evt_2","type":"checkout.session.expired","created":1726300060,"data":{{"object":{{"id":"cs_live_42","metadata":{{"order_id":"{order_id}"}}}}}}}}"#
    )
}

fn sign(body: &str) -> String {
    calculate_hmac(TEST_WEBHOOK_SECRET, body.as_bytes())
}

/// Fires `body` at the webhook route behind the HMAC middleware. Middleware rejections come back as an error
/// response too, so every test reads a plain status and body.
async fn send_event(body: &str, signature: Option<&str>, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new()
        .app_data(web::Data::new(server_options()))
        .wrap(HmacMiddlewareFactory::new(PAYMENT_SIGNATURE_HEADER, Secret::new(TEST_WEBHOOK_SECRET.to_string())))
        .configure(configure);
    let service = test::init_service(app).await;
    let mut req = TestRequest::post()
        .uri("/payments")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(body.to_string());
    if let Some(signature) = signature {
        req = req.insert_header((PAYMENT_SIGNATURE_HEADER, signature));
    }
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

fn configure_fulfilment(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order_fixture(OrderStatus::Initiated))));
    db.expect_transition_order_status()
        .withf(|_, from, to| *from == OrderStatus::Initiated && *to == OrderStatus::Paid)
        .returning(|_, _, to| Ok(Some(order_fixture(to))));
    db.expect_transition_item_status()
        .withf(|_, from, to| *from == ItemStatus::Approved && *to == ItemStatus::Sold)
        .returning(|_, _, to| Ok(Some(item_fixture(to))));
    cfg.service(PaymentWebhookRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

/// No expectations at all: if any of these requests reach the database, mockall panics and the test fails.
fn configure_untouchable(cfg: &mut ServiceConfig) {
    let db = MockMarketplace::new();
    cfg.service(PaymentWebhookRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_settled(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order_fixture(OrderStatus::Paid))));
    db.expect_transition_order_status().returning(|_, _, _| Ok(None));
    cfg.service(PaymentWebhookRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_unknown_order(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    cfg.service(PaymentWebhookRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_storage_failure(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order_fixture(OrderStatus::Initiated))));
    db.expect_transition_order_status()
        .returning(|_, _, _| Err(MarketplaceError::DatabaseError("database is locked".to_string())));
    cfg.service(PaymentWebhookRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_failed_payment(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order_fixture(OrderStatus::Initiated))));
    db.expect_transition_order_status()
        .withf(|_, from, to| *from == OrderStatus::Initiated && *to == OrderStatus::Failed)
        .returning(|_, _, to| Ok(Some(order_fixture(to))));
    cfg.service(PaymentWebhookRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_item_not_sellable(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order_fixture(OrderStatus::Initiated))));
    db.expect_transition_order_status().returning(|_, _, to| Ok(Some(order_fixture(to))));
    db.expect_transition_item_status().returning(|_, _, _| Ok(None));
    cfg.service(PaymentWebhookRoute::<MockMarketplace>::new()).app_data(web::Data::new(OrderFlowApi::new(db)));
}

#[actix_web::test]
async fn a_signed_completed_event_fulfils_the_order() {
    let _ = env_logger::try_init().ok();
    let body = completed_event("ord-1001");
    let signature = sign(&body);
    let (status, body) = send_event(&body, Some(&signature), configure_fulfilment).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "got: {body}");
    assert!(body.contains("paid and item"), "got: {body}");
}

#[actix_web::test]
async fn a_tampered_body_never_reaches_the_handler() {
    let _ = env_logger::try_init().ok();
    let signature = sign(&completed_event("ord-1001"));
    let tampered = completed_event("ord-2002");
    let (status, body) = send_event(&tampered, Some(&signature), configure_untouchable).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("signature"), "got: {body}");
}

#[actix_web::test]
async fn unsigned_events_never_reach_the_handler() {
    let _ = env_logger::try_init().ok();
    let body = completed_event("ord-1001");
    let (status, _) = send_event(&body, None, configure_untouchable).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn replayed_events_are_acknowledged_without_effect() {
    let _ = env_logger::try_init().ok();
    let body = completed_event("ord-1001");
    let signature = sign(&body);
    let (status, body) = send_event(&body, Some(&signature), configure_settled).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("already settled"), "got: {body}");
}

#[actix_web::test]
async fn events_for_unknown_orders_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let body = completed_event("ord-9999");
    let signature = sign(&body);
    let (status, body) = send_event(&body, Some(&signature), configure_unknown_order).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No order ord-9999 exists"), "got: {body}");
}

#[actix_web::test]
async fn unhandled_event_types_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"id":"evt_3","type":"invoice.paid","created":1726300120,"data":{"object":{"id":"in_live_7","metadata":{"order_id":"ord-1001"}}}}"#;
    let signature = sign(body);
    let (status, body) = send_event(body, Some(&signature), configure_untouchable).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("invoice.paid is not handled"), "got: {body}");
}

#[actix_web::test]
async fn events_without_an_order_id_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"id":"evt_4","type":"checkout.session.completed","created":1726300180,"data":{"object":{"id":"cs_live_43","metadata":{}}}}"#;
    let signature = sign(body);
    let (status, body) = send_event(body, Some(&signature), configure_untouchable).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No order id in event"), "got: {body}");
}

#[actix_web::test]
async fn storage_failures_ask_the_processor_to_redeliver() {
    let _ = env_logger::try_init().ok();
    let body = completed_event("ord-1001");
    let signature = sign(&body);
    let (status, body) = send_event(&body, Some(&signature), configure_storage_failure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("database is locked"), "got: {body}");
}

#[actix_web::test]
async fn an_expired_session_fails_the_order_and_keeps_the_item_listed() {
    let _ = env_logger::try_init().ok();
    let body = expired_event("ord-1001");
    let signature = sign(&body);
    let (status, body) = send_event(&body, Some(&signature), configure_failed_payment).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("marked as failed"), "got: {body}");
}

#[actix_web::test]
async fn a_paid_order_with_an_unsellable_item_is_still_acknowledged() {
    let _ = env_logger::try_init().ok();
    let body = completed_event("ord-1001");
    let signature = sign(&body);
    let (status, body) = send_event(&body, Some(&signature), configure_item_not_sellable).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("NOT marked sold"), "got: {body}");
}

#[actix_web::test]
async fn well_signed_garbage_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let body = "this is not an event";
    let signature = sign(body);
    let (status, _) = send_event(body, Some(&signature), configure_untouchable).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
