//! HMAC middleware for Actix Web.
//!
//! The payment processor signs every webhook delivery with HMAC-SHA256 over the exact raw body, under the shared
//! `BPG_WEBHOOK_SECRET` key, and carries the base64 digest in the `X-Payment-Signature` header.
//!
//! This middleware wraps the webhook scope and verifies that signature before any payload parsing happens. A
//! request with a missing or invalid signature is answered with 400 and never reaches a handler. Verification
//! cannot be switched off; a server without the right key rejects every delivery, which is loud and safe.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use bpg_common::Secret;
use futures::future::LocalBoxFuture;
use log::{trace, warn};

use crate::{errors::ServerError, helpers::verify_signature};

pub const PAYMENT_SIGNATURE_HEADER: &str = "X-Payment-Signature";

pub struct HmacMiddlewareFactory {
    hmac_header: String,
    key: Secret<String>,
}

impl HmacMiddlewareFactory {
    pub fn new(hmac_header: &str, key: Secret<String>) -> Self {
        HmacMiddlewareFactory { hmac_header: hmac_header.into(), key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService {
            hmac_header: self.hmac_header.clone(),
            key: self.key.clone(),
            service: Rc::new(service),
        }))
    }
}

pub struct HmacMiddlewareService<S> {
    hmac_header: String,
    key: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.key.reveal().clone();
        let hmac_header = self.hmac_header.clone();
        Box::pin(async move {
            trace!("🔐️ Checking HMAC for request");
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ServerError::InvalidRequestBody("Failed to extract request data.".to_string())
            })?;
            let signature = req
                .headers()
                .get(&hmac_header)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    warn!("🔐️ No HMAC signature found in request. Denying access.");
                    ServerError::InvalidSignature
                })?
                .to_string();
            if verify_signature(&secret, data.as_ref(), &signature) {
                trace!("🔐️ HMAC check for request ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid HMAC signature found in request. Denying access.");
                Err(ServerError::InvalidSignature.into())
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
