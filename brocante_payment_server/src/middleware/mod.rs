mod hmac;

pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService, PAYMENT_SIGNATURE_HEADER};
