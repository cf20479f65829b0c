//! # Database backend contracts.
//!
//! This module defines the behaviour a storage backend must expose in order to drive the Brocante payment engine.
//!
//! * [`MarketplaceDatabase`] defines the mutating flows: order intake, the guarded status transitions for orders and
//!   items, and checkout-session bookkeeping. Every transition is a storage-level compare-and-swap, which is the
//!   engine's only concurrency primitive.
//! * [`CatalogManagement`] provides read-only queries over orders and items.
//! * [`SettingsManagement`] reads and writes the key/value settings store.

mod catalog_management;
mod marketplace_database;
mod settings_management;

mod data_objects;

pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use data_objects::PaymentOutcome;
pub use marketplace_database::{MarketplaceDatabase, MarketplaceError};
pub use settings_management::{SettingsApiError, SettingsManagement};
