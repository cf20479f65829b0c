//! SQLite database module for the Brocante Payment Engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
