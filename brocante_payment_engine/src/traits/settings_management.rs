use thiserror::Error;

use crate::db_types::SettingsEntry;

#[derive(Debug, Clone, Error)]
pub enum SettingsApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

impl From<sqlx::Error> for SettingsApiError {
    fn from(e: sqlx::Error) -> Self {
        SettingsApiError::DatabaseError(e.to_string())
    }
}

/// Access to the key/value settings store. Values are raw JSON text; interpretation happens at the API layer.
#[allow(async_fn_in_trait)]
pub trait SettingsManagement {
    /// Fetches the raw value for the given key, or `None` if the key has never been written.
    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, SettingsApiError>;

    /// Inserts or replaces the value for the given key, returning the stored row.
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<SettingsEntry, SettingsApiError>;

    /// All settings rows.
    async fn fetch_all_settings(&self) -> Result<Vec<SettingsEntry>, SettingsApiError>;
}
