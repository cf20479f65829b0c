//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause
//! the current worker to stop processing new requests. Any long, non-cpu-bound operation (database calls, requests
//! to the payment processor) must therefore be awaited, never blocked on.

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    get,
    http::header,
    post,
    web,
    HttpRequest,
    HttpResponse,
    Responder,
};
use bpg_common::Money;
use brocante_payment_engine::{
    db_types::OrderId,
    order_objects::{NewItemRequest, NewOrderRequest},
    pricing::CommissionConfig,
    traits::{CatalogManagement, MarketplaceDatabase, SettingsManagement},
    CatalogApi,
    OrderFlowApi,
    SettingsApi,
    SettingsView,
    COMMISSION_CONFIG_KEY,
    DEFAULT_SHIPPING_FEE_KEY,
};
use hosted_checkout::{CheckoutApi, CheckoutLineItem, CheckoutSessionRequest};
use log::*;

use crate::{
    auth::{AdminClaims, AdminTokens, ADMIN_COOKIE_NAME},
    config::ServerOptions,
    data_objects::{CheckoutParams, JsonResponse, LoginRequest, LoginResponse, ModerationRequest, SettingUpdateRequest},
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
/// Route handler for the auth endpoint
///
/// Exchanges the admin passphrase for a session token. The token comes back in the JSON body for API clients, and
/// is also set as an HttpOnly cookie so a browser-based admin UI never has to handle the raw token in script.
#[post("/auth")]
pub async fn login(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    tokens: web::Data<AdminTokens>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received login request");
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown peer".to_string());
    let token = tokens.login(&body.password).map_err(|e| {
        warn!("💻️ Admin login failed from {peer}. {e}");
        ServerError::from(e)
    })?;
    let cookie = Cookie::build(ADMIN_COOKIE_NAME, token.clone())
        .path("/")
        .max_age(CookieDuration::seconds(tokens.token_ttl().num_seconds()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    info!("💻️ Admin login succeeded from {peer}");
    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse { token }))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(new_order => Post "/orders" impl MarketplaceDatabase);
/// Route handler for order intake.
///
/// Takes the buyer's contact details plus the item and fulfilment choice, prices the order against the current
/// settings and responds with the stored order, including the server-assigned order id the storefront needs to
/// send the buyer to checkout.
pub async fn new_order<B: MarketplaceDatabase>(
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST new order for item [{}]", request.item_id);
    let order = api.create_order(request).await?;
    Ok(HttpResponse::Created().json(order))
}

//----------------------------------------------   Items  ----------------------------------------------------
route!(new_item => Post "/items" impl MarketplaceDatabase);
/// Route handler for item submissions. New items always start out hidden, waiting for moderation.
pub async fn new_item<B: MarketplaceDatabase>(
    body: web::Json<NewItemRequest>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST new item \"{}\"", request.title);
    let item = api.submit_item(request).await?;
    Ok(HttpResponse::Created().json(item))
}

route!(list_items => Get "/items" impl CatalogManagement);
/// The public catalog. Only approved items are listed; pending, rejected and sold items never appear here.
pub async fn list_items<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET items");
    let items = api.approved_items().await?;
    Ok(HttpResponse::Ok().json(items))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Get "/checkout" impl MarketplaceDatabase);
/// Route handler for the checkout redirect.
///
/// Opens a hosted checkout session for an `initiated` order and answers with a 303 redirect to the processor's
/// payment page. Hitting this endpoint again for the same order opens a fresh session and replaces the recorded
/// session reference; the order itself is untouched.
pub async fn checkout<B: MarketplaceDatabase>(
    params: web::Query<CheckoutParams>,
    api: web::Data<OrderFlowApi<B>>,
    payments: web::Data<CheckoutApi>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(params.into_inner().order_id);
    debug!("💻️ GET checkout for order [{order_id}]");
    let (order, item) = api.checkout_context(&order_id).await?;
    let line_item =
        CheckoutLineItem { name: item.title, description: item.description, unit_amount: order.total, quantity: 1 };
    let storefront = options.storefront_url.trim_end_matches('/');
    let request = CheckoutSessionRequest::single_item(
        "ILS",
        line_item,
        format!("{storefront}/checkout/success?order={order_id}"),
        format!("{storefront}/checkout/cancelled?order={order_id}"),
        order.order_id.to_string(),
    );
    let session = payments.create_checkout_session(&request).await?;
    api.attach_payment_session(&order_id, &session.id).await?;
    Ok(HttpResponse::SeeOther().insert_header((header::LOCATION, session.url)).finish())
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(admin_orders => Get "/admin/orders" impl CatalogManagement);
/// Every order on record, newest first. The admin UI uses this as its reconciliation work list.
pub async fn admin_orders<B: CatalogManagement>(
    claims: AdminClaims,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin orders (token issued {})", claims.issued_at);
    let orders = api.orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(admin_items => Get "/admin/items" impl CatalogManagement);
/// Every item on record, including the ones still waiting for moderation.
pub async fn admin_items<B: CatalogManagement>(
    _claims: AdminClaims,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin items");
    let items = api.items().await?;
    Ok(HttpResponse::Ok().json(items))
}

route!(moderate_item => Patch "/admin/items" impl MarketplaceDatabase);
/// Route handler for item moderation.
///
/// The verdict may only be `approved` or `rejected`. If the item is no longer awaiting moderation the call
/// changes nothing and says so, which makes double-submits from the admin UI harmless.
pub async fn moderate_item<B: MarketplaceDatabase>(
    _claims: AdminClaims,
    body: web::Json<ModerationRequest>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let ModerationRequest { item_id, status } = body.into_inner();
    debug!("💻️ PATCH moderate item [{item_id}] to {status}");
    match api.moderate_item(&item_id, status).await? {
        Some(item) => Ok(HttpResponse::Ok().json(item)),
        None => Ok(HttpResponse::Ok()
            .json(JsonResponse::failure(format!("Item {item_id} is not awaiting moderation. Nothing was changed")))),
    }
}

//----------------------------------------------   Settings  ----------------------------------------------------
route!(admin_settings => Get "/admin/settings" impl SettingsManagement);
pub async fn admin_settings<B: SettingsManagement>(
    _claims: AdminClaims,
    api: web::Data<SettingsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin settings");
    let settings = api.all().await?;
    Ok(HttpResponse::Ok().json(settings))
}

route!(update_setting => Patch "/admin/settings" impl SettingsManagement);
/// Route handler for settings updates.
///
/// The two known keys are validated before they are written: a commission config must deserialize into the
/// commission schema, and the shipping fee must be a non-negative integer amount in agorot. Unknown keys are
/// stored as-is; nothing in the engine reads them, but the admin UI is free to keep its own state here.
pub async fn update_setting<B: SettingsManagement>(
    _claims: AdminClaims,
    body: web::Json<SettingUpdateRequest>,
    api: web::Data<SettingsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let SettingUpdateRequest { key, value } = body.into_inner();
    debug!("💻️ PATCH setting [{key}]");
    let entry = match key.as_str() {
        COMMISSION_CONFIG_KEY => {
            let config: CommissionConfig = serde_json::from_value(value)
                .map_err(|e| ServerError::InvalidRequestBody(format!("not a valid commission config: {e}")))?;
            api.set_commission_config(config).await?
        },
        DEFAULT_SHIPPING_FEE_KEY => {
            let fee = value.as_i64().ok_or_else(|| {
                ServerError::InvalidRequestBody("shipping fee must be an integer amount in agorot".to_string())
            })?;
            api.set_default_shipping_fee(Money::from(fee)).await?
        },
        _ => api.set_raw(&key, &value).await?,
    };
    Ok(HttpResponse::Ok().json(SettingsView::from(entry)))
}

route!(public_settings => Get "/settings" impl SettingsManagement);
/// The settings snapshot the storefront prices its quotes from. Served uncacheable: a stale commission or
/// shipping fee here would show buyers a total that checkout no longer charges.
pub async fn public_settings<B: SettingsManagement>(
    api: web::Data<SettingsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET public settings");
    let settings = api.market_settings().await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"))
        .insert_header((header::PRAGMA, "no-cache"))
        .json(settings))
}
