//! Brocante Payment Engine
//!
//! The engine owns the order lifecycle of the Brocante marketplace: listings are captured as items, purchases as
//! orders with a price breakdown snapshotted at creation, and payment outcomes drive the two status state machines.
//! It is transport-agnostic; the HTTP server is a thin shell over the APIs exported here.
//!
//! The library is divided into two main sections:
//! 1. Database management and control. SQLite is the supported backend. You should never need to access the
//!    database directly. Instead, use the public API provided by the engine. The exception is the data types used in
//!    the database. These are defined in the [`db_types`] module and are public.
//! 2. The engine public API ([`OrderFlowApi`], [`CatalogApi`], [`SettingsApi`]). Backends implement the traits in
//!    the [`traits`] module in order to serve these APIs.
//!
//! Every status change in the engine is a guarded conditional update: the store applies "set status to X where the
//! status is currently Y" atomically and reports whether it took effect. Payment events can therefore be replayed or
//! arrive out of order without double-applying any effect.

mod bpe_api;
pub mod db_types;
pub mod pricing;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use bpe_api::{
    catalog_api::CatalogApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    settings_api::{SettingsApi, SettingsView, COMMISSION_CONFIG_KEY, DEFAULT_SHIPPING_FEE_KEY},
};
