use sqlx::SqliteConnection;

use crate::db_types::SettingsEntry;

pub async fn fetch_setting(key: &str, conn: &mut SqliteConnection) -> Result<Option<String>, sqlx::Error> {
    let value: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = $1").bind(key).fetch_optional(conn).await?;
    Ok(value.map(|(v,)| v))
}

/// Inserts or replaces the value for the given key in one statement.
pub async fn upsert_setting(key: &str, value: &str, conn: &mut SqliteConnection) -> Result<SettingsEntry, sqlx::Error> {
    let entry = sqlx::query_as(
        r#"
            INSERT INTO settings (key, value) VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(key)
    .bind(value)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

pub async fn fetch_all_settings(conn: &mut SqliteConnection) -> Result<Vec<SettingsEntry>, sqlx::Error> {
    let entries = sqlx::query_as("SELECT * FROM settings ORDER BY key").fetch_all(conn).await?;
    Ok(entries)
}
