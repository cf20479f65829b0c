use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use brocante_payment_engine::{CatalogApi, OrderFlowApi, SettingsApi, SqliteDatabase};
use hosted_checkout::CheckoutApi;
use log::info;

use crate::{
    auth::AdminTokens,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    middleware::{HmacMiddlewareFactory, PAYMENT_SIGNATURE_HEADER},
    routes::{
        health,
        login,
        AdminItemsRoute,
        AdminOrdersRoute,
        AdminSettingsRoute,
        CheckoutRoute,
        ListItemsRoute,
        ModerateItemRoute,
        NewItemRoute,
        NewOrderRoute,
        PublicSettingsRoute,
        UpdateSettingRoute,
    },
    webhook_routes::PaymentWebhookRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    SqliteDatabase::create_database_if_missing(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let payments = CheckoutApi::new(config.payment.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Payment processor client ready for {}", config.payment.api_url);
    let srv = create_server_instance(config, db, payments)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    payments: CheckoutApi,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let settings_api = SettingsApi::new(db.clone());
        let admin_tokens = AdminTokens::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bps::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(settings_api))
            .app_data(web::Data::new(admin_tokens))
            .app_data(web::Data::new(payments.clone()))
            .app_data(web::Data::new(options.clone()));
        // Webhook deliveries carry an HMAC signature over the raw body; the middleware verifies it before any
        // handler sees the payload.
        let webhook_scope = web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(PAYMENT_SIGNATURE_HEADER, config.webhook_secret.clone()))
            .service(PaymentWebhookRoute::<SqliteDatabase>::new());
        let api_scope = web::scope("/api")
            .service(login)
            .service(NewOrderRoute::<SqliteDatabase>::new())
            .service(NewItemRoute::<SqliteDatabase>::new())
            .service(ListItemsRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(PublicSettingsRoute::<SqliteDatabase>::new())
            .service(AdminOrdersRoute::<SqliteDatabase>::new())
            .service(AdminItemsRoute::<SqliteDatabase>::new())
            .service(ModerateItemRoute::<SqliteDatabase>::new())
            .service(AdminSettingsRoute::<SqliteDatabase>::new())
            .service(UpdateSettingRoute::<SqliteDatabase>::new())
            .service(webhook_scope);
        app.service(health).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
