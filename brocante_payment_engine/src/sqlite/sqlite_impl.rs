//! `SqliteDatabase` is a concrete implementation of a Brocante payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, items, new_pool, orders, settings};
use crate::{
    db_types::{Item, ItemId, ItemStatus, NewItem, NewOrder, Order, OrderId, OrderStatus, SettingsEntry},
    traits::{
        CatalogApiError,
        CatalogManagement,
        MarketplaceDatabase,
        MarketplaceError,
        SettingsApiError,
        SettingsManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_item(&self, item: NewItem) -> Result<Item, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let item = items::insert_item(item, &mut conn).await?;
        debug!("🗃️ Item [{}] has been saved in the DB", item.id);
        Ok(item)
    }

    /// Stores a new order. The existence check and the insert run inside one transaction, so two submissions racing
    /// on the same order id cannot both come back as inserted.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] has been saved in the DB with id {}", order.order_id, order.id);
        Ok(order)
    }

    async fn transition_order_status(
        &self,
        order_id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, from, to, &mut conn).await?;
        Ok(order)
    }

    async fn transition_item_status(
        &self,
        item_id: &ItemId,
        from: ItemStatus,
        to: ItemStatus,
    ) -> Result<Option<Item>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let item = items::update_item_status(item_id, from, to, &mut conn).await?;
        Ok(item)
    }

    async fn update_payment_session(
        &self,
        order_id: &OrderId,
        session_ref: &str,
    ) -> Result<Option<Order>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_payment_session(order_id, session_ref, &mut conn).await?;
        Ok(order)
    }

    async fn close(&mut self) -> Result<(), MarketplaceError> {
        self.pool.close().await;
        Ok(())
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_all_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn fetch_item_by_id(&self, item_id: &ItemId) -> Result<Option<Item>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let item = items::fetch_item_by_id(item_id, &mut conn).await?;
        Ok(item)
    }

    async fn fetch_items(&self) -> Result<Vec<Item>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = items::fetch_all_items(&mut conn).await?;
        Ok(items)
    }

    async fn fetch_items_by_status(&self, status: ItemStatus) -> Result<Vec<Item>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = items::fetch_items_by_status(status, &mut conn).await?;
        Ok(items)
    }
}

impl SettingsManagement for SqliteDatabase {
    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, SettingsApiError> {
        let mut conn = self.pool.acquire().await?;
        let value = settings::fetch_setting(key, &mut conn).await?;
        Ok(value)
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<SettingsEntry, SettingsApiError> {
        let mut conn = self.pool.acquire().await?;
        let entry = settings::upsert_setting(key, value, &mut conn).await?;
        debug!("🗃️ Setting [{key}] has been saved in the DB");
        Ok(entry)
    }

    async fn fetch_all_settings(&self) -> Result<Vec<SettingsEntry>, SettingsApiError> {
        let mut conn = self.pool.acquire().await?;
        let entries = settings::fetch_all_settings(&mut conn).await?;
        Ok(entries)
    }
}

impl SqliteDatabase {
    /// Creates a new database api object, reading the url from the environment or using the default.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Creates the database file (and its parent directory) if it does not exist yet. A no-op on an existing
    /// database.
    pub async fn create_database_if_missing(url: &str) -> Result<(), sqlx::Error> {
        use sqlx::{migrate::MigrateDatabase, Sqlite};
        if let Some(dir) = url.strip_prefix("sqlite://").and_then(|p| std::path::Path::new(p).parent()) {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        if !Sqlite::database_exists(url).await? {
            info!("🗃️ Database {url} does not exist yet. Creating it.");
            Sqlite::create_database(url).await?;
        }
        Ok(())
    }

    /// Applies any embedded migrations that have not run against this database yet.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        debug!("🗃️ Database migrations are up to date");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
