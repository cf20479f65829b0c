//! A thin, typed client for the hosted payment processor.
//!
//! The rest of the system never talks HTTP to the processor directly. It hands a [`CheckoutSessionRequest`] to
//! [`CheckoutApi::create_checkout_session`] and gets back a [`CheckoutSession`] carrying the opaque session id and
//! the hosted payment page URL. Webhook payloads the processor sends back are modelled by [`PaymentEvent`].

mod api;
mod config;
mod error;

mod data_objects;

pub use api::CheckoutApi;
pub use config::CheckoutConfig;
pub use data_objects::{
    CheckoutLineItem,
    CheckoutSession,
    CheckoutSessionRequest,
    EventMetadata,
    EventObject,
    PaymentEvent,
    PaymentEventType,
};
pub use error::CheckoutApiError;
