//! # Brocante payment server
//! This module hosts the HTTP layer of the Brocante marketplace gateway. It is responsible for:
//! Taking in item submissions and buyer orders.
//! Redirecting buyers to the hosted payment page for their order.
//! Listening for signed payment event webhooks from the payment processor and applying them to the order lifecycle.
//! Serving the admin API (moderation, order overview, settings) behind token authentication.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! All business routes are mounted under `/api`; `/health` is the only bare route. The webhook route at
//! `/api/webhook/payments` is wrapped in HMAC signature-checking middleware and never sees an unverified body.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

pub mod webhook_routes;
