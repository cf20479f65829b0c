//! # Brocante engine public API
//!
//! The API is modular, so that clients can pick and choose the functionality they need:
//!
//! * [`order_flow_api`] is the primary API for the order lifecycle: intake, checkout-session bookkeeping, and the
//!   handling of asynchronous payment events.
//! * [`catalog_api`] serves item submission, listing queries, and moderation.
//! * [`settings_api`] reads and writes the shared marketplace settings (commission rule, default shipping fee).
//!
//! The pattern for using the APIs is the same everywhere: construct the API with a database backend that implements
//! the traits the API requires, then call its methods. [`crate::SqliteDatabase`] implements all of them.

pub mod catalog_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod settings_api;
