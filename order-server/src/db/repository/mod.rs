//! Repository Module
//!
//! SQLite 仓储：每张表一个模块，全部是接收 `&SqlitePool` 的自由函数。
//! [`SqliteStore`] 把它们组装成对话核心需要的 trait 实现。

pub mod menu;
pub mod order;
pub mod reservation;
pub mod user;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::models::{
    DeliveryDetails, MenuItem, NewOrderItem, NewReservation, Order, OrderItem, OrderStatus,
    OrderWithItems, Reservation, UserProfile,
};
use sqlx::SqlitePool;
use thiserror::Error;

use super::store::{
    CatalogProvider, OrderStore, ReservationStore, SlotOutcome, StoreError, StoreResult,
    UserDirectory,
};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => StoreError::NotFound(msg),
            RepoError::Duplicate(msg) | RepoError::Database(msg) => StoreError::Database(msg),
            RepoError::Validation(msg) => StoreError::Internal(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// sqlx SQLite implementation of the collaborator traits
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CatalogProvider for SqliteStore {
    async fn list_available(&self) -> StoreResult<Vec<MenuItem>> {
        Ok(menu::find_available(&self.pool).await?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<MenuItem>> {
        Ok(menu::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<MenuItem>> {
        Ok(menu::find_by_name(&self.pool, name).await?)
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn resolve(&self, external_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(user::find_by_external_id(&self.pool, external_id).await?)
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn find_draft(&self, user_id: i64) -> StoreResult<Option<Order>> {
        Ok(order::find_draft(&self.pool, user_id).await?)
    }

    async fn create_draft(&self, user_id: i64, now: i64) -> StoreResult<Order> {
        Ok(order::create_draft(&self.pool, user_id, now).await?)
    }

    async fn list_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>> {
        Ok(order::list_items(&self.pool, order_id).await?)
    }

    async fn insert_item(&self, order_id: i64, item: &NewOrderItem) -> StoreResult<OrderItem> {
        Ok(order::insert_item(&self.pool, order_id, item).await?)
    }

    async fn update_item(&self, item_id: i64, quantity: i32, notes: &str) -> StoreResult<()> {
        Ok(order::update_item(&self.pool, item_id, quantity, notes).await?)
    }

    async fn delete_item(&self, item_id: i64) -> StoreResult<bool> {
        Ok(order::delete_item(&self.pool, item_id).await?)
    }

    async fn delete_order(&self, order_id: i64) -> StoreResult<bool> {
        Ok(order::delete_order(&self.pool, order_id).await?)
    }

    async fn promote_draft(
        &self,
        order_id: i64,
        delivery: &DeliveryDetails,
        now: i64,
    ) -> StoreResult<Order> {
        Ok(order::promote_draft(&self.pool, order_id, delivery, now).await?)
    }

    async fn create_order(
        &self,
        user_id: i64,
        delivery: &DeliveryDetails,
        items: &[NewOrderItem],
        now: i64,
    ) -> StoreResult<Order> {
        Ok(order::create_order(&self.pool, user_id, delivery, items, now).await?)
    }

    async fn set_status(&self, order_id: i64, status: OrderStatus, now: i64) -> StoreResult<()> {
        Ok(order::set_status(&self.pool, order_id, status, now).await?)
    }

    async fn find_pending_since(&self, user_id: i64, since: i64) -> StoreResult<Vec<Order>> {
        Ok(order::find_pending_since(&self.pool, user_id, since).await?)
    }

    async fn recent_orders(&self, user_id: i64, limit: u32) -> StoreResult<Vec<OrderWithItems>> {
        Ok(order::recent_orders(&self.pool, user_id, limit).await?)
    }

    async fn delete_stale_drafts(&self, before: i64) -> StoreResult<u64> {
        Ok(order::delete_stale_drafts(&self.pool, before).await?)
    }
}

#[async_trait]
impl ReservationStore for SqliteStore {
    async fn count_at(&self, date: NaiveDate, time: NaiveTime) -> StoreResult<i64> {
        Ok(reservation::count_at(&self.pool, date, time).await?)
    }

    async fn find_by_slot(
        &self,
        customer_name: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> StoreResult<Option<Reservation>> {
        Ok(reservation::find_by_slot(&self.pool, customer_name, date, time).await?)
    }

    async fn insert_if_available(
        &self,
        new: &NewReservation,
        capacity: i64,
    ) -> StoreResult<SlotOutcome> {
        Ok(reservation::insert_if_available(&self.pool, new, capacity).await?)
    }

    async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<Reservation>> {
        Ok(reservation::find_by_user(&self.pool, user_id).await?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    /// Single-connection in-memory database with migrations applied
    pub async fn memory_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .pragma("foreign_keys", "ON");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    pub async fn add_user(pool: &SqlitePool, external_id: &str, name: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO app_user (external_id, name) VALUES (?, ?) RETURNING id",
        )
        .bind(external_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
    }
}
