use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::ServiceResponse,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use bpg_common::Secret;
use brocante_payment_engine::{db_types::ItemStatus, CatalogApi};
use chrono::{Duration, Utc};

use super::{
    helpers::{admin_tokens, get_request, item_fixture, send_request, server_options, TEST_ADMIN_PASSWORD},
    mocks::MockMarketplace,
};
use crate::{
    auth::{AdminTokens, ADMIN_COOKIE_NAME},
    config::AuthConfig,
    data_objects::{LoginRequest, LoginResponse},
    routes::{login, AdminItemsRoute},
};

async fn try_login(password: &str) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(admin_tokens()))
            .app_data(web::Data::new(server_options()))
            .service(login),
    )
    .await;
    let req = TestRequest::post().uri("/auth").set_json(LoginRequest { password: password.to_string() }).to_request();
    test::call_service(&app, req).await
}

fn configure_admin_items(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplace::new();
    db.expect_fetch_items().returning(|| Ok(vec![item_fixture(ItemStatus::PendingApproval)]));
    cfg.service(AdminItemsRoute::<MockMarketplace>::new()).app_data(web::Data::new(CatalogApi::new(db)));
}

#[actix_web::test]
async fn login_returns_a_token_and_a_locked_down_cookie() {
    let _ = env_logger::try_init().ok();
    let res = try_login(TEST_ADMIN_PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    let (http_only, same_site, path, max_age, cookie_value) = {
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == ADMIN_COOKIE_NAME)
            .expect("login did not set the admin cookie");
        (
            cookie.http_only(),
            cookie.same_site(),
            cookie.path().map(String::from),
            cookie.max_age(),
            cookie.value().to_string(),
        )
    };
    assert_eq!(http_only, Some(true));
    assert_eq!(same_site, Some(SameSite::Lax));
    assert_eq!(path.as_deref(), Some("/"));
    assert_eq!(max_age, Some(CookieDuration::seconds(43_200)));
    let body: LoginResponse = test::read_body_json(res).await;
    assert_eq!(body.token, cookie_value);
    admin_tokens().validate_token(&body.token).expect("login issued a token that does not validate");
}

#[actix_web::test]
async fn wrong_passphrase_is_rejected_without_a_cookie() {
    let _ = env_logger::try_init().ok();
    let res = try_login("letmein").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.response().cookies().next().is_none(), "a failed login must not set any cookie");
}

#[actix_web::test]
async fn bearer_tokens_open_admin_routes() {
    let _ = env_logger::try_init().ok();
    let token = admin_tokens().issue_token();
    let (status, body) = get_request(&token, "/admin/items", configure_admin_items).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Teak sideboard"), "got: {body}");
}

#[actix_web::test]
async fn cookie_tokens_open_admin_routes() {
    let _ = env_logger::try_init().ok();
    let token = admin_tokens().issue_token();
    let req = TestRequest::get().uri("/admin/items").cookie(Cookie::new(ADMIN_COOKIE_NAME, token));
    let (status, _) = send_request(req, configure_admin_items).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn missing_tokens_are_unauthorized() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/admin/items", configure_admin_items).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No admin token"), "got: {body}");
}

#[actix_web::test]
async fn tokens_from_another_deployment_are_unauthorized() {
    let _ = env_logger::try_init().ok();
    let foreign = AdminTokens::new(&AuthConfig {
        admin_password: Secret::new(TEST_ADMIN_PASSWORD.to_string()),
        auth_secret: Secret::new("some-other-signing-key".to_string()),
        token_ttl: Duration::seconds(43_200),
    });
    let (status, _) = get_request(&foreign.issue_token(), "/admin/items", configure_admin_items)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn expired_tokens_are_unauthorized() {
    let _ = env_logger::try_init().ok();
    let stale = admin_tokens().issue_token_at(Utc::now() - Duration::seconds(43_201));
    let (status, body) = get_request(&stale, "/admin/items", configure_admin_items).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("expired"), "got: {body}");
}

#[actix_web::test]
async fn mangled_tokens_are_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let (status, _) =
        get_request("!!not-a-token!!", "/admin/items", configure_admin_items).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
