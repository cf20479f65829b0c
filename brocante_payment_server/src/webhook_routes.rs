//----------------------------------------------   Webhook  ----------------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use brocante_payment_engine::{
    db_types::OrderId,
    traits::{MarketplaceDatabase, MarketplaceError},
    OrderFlowApi,
};
use hosted_checkout::{PaymentEvent, PaymentEventType};
use log::*;

use crate::{
    config::ServerOptions,
    data_objects::JsonResponse,
    errors::ServerError,
    helpers::get_remote_ip,
    route,
};

route!(payment_webhook => Post "/payments" impl MarketplaceDatabase);
/// Route handler for payment notifications.
///
/// By the time this handler runs, the HMAC middleware has already verified the signature over the raw body, so
/// every event that arrives here is authentic.
///
/// Deliveries are at-least-once and unordered, so every coherent event is answered with 200: replays, events for
/// unknown orders and event types this system does not act on included. Anything else would make the processor
/// redeliver an event that was understood perfectly well. The one exception is a storage failure. Nothing was
/// applied in that case, and a 5xx asks the processor to deliver the event again later.
pub async fn payment_webhook<B: MarketplaceDatabase>(
    req: HttpRequest,
    body: web::Json<PaymentEvent>,
    api: web::Data<OrderFlowApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let event = body.into_inner();
    if let Some(ip) = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded) {
        trace!("🛒️ Received payment event {} ({}) from {ip}", event.id, event.event_type);
    } else {
        trace!("🛒️ Received payment event {} ({})", event.id, event.event_type);
    }
    let Some(order_id) = event.order_id().map(|id| OrderId(id.to_string())) else {
        info!("🛒️ Payment event {} ({}) carries no order id. Acknowledged without effect", event.id, event.event_type);
        return Ok(HttpResponse::Ok().json(JsonResponse::success("No order id in event. Nothing to do")));
    };
    let result = match event.event_type {
        PaymentEventType::CheckoutSessionCompleted => api.process_payment_succeeded(&order_id).await,
        PaymentEventType::CheckoutSessionExpired | PaymentEventType::PaymentFailed => {
            api.process_payment_failed(&order_id).await
        },
        PaymentEventType::Other(ref t) => {
            info!("🛒️ Ignoring payment event {} of unhandled type {t}", event.id);
            return Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Event type {t} is not handled"))));
        },
    };
    match result {
        Ok(outcome) => {
            if outcome.is_noop() {
                info!("🛒️ Payment event {} acknowledged without effect. {outcome}", event.id);
            } else {
                info!("🛒️ Payment event {} applied. {outcome}", event.id);
            }
            Ok(HttpResponse::Ok().json(JsonResponse::success(outcome)))
        },
        Err(MarketplaceError::DatabaseError(e)) => {
            warn!("🛒️ Could not apply payment event {}. {e}", event.id);
            Err(ServerError::BackendError(e))
        },
        Err(e) => {
            warn!("🛒️ Unexpected error while handling payment event {}. {e}", event.id);
            Err(ServerError::from(e))
        },
    }
}
