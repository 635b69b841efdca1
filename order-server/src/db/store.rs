//! Collaborator traits consumed by the chat engine
//!
//! 对话核心只依赖这些窄接口；两套实现：
//! - [`MemoryStore`](super::memory::MemoryStore) - 测试 / `STORAGE=memory`
//! - [`SqliteStore`](super::repository::SqliteStore) - 生产 (sqlx SQLite)

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::models::{
    DeliveryDetails, MenuItem, NewOrderItem, NewReservation, Order, OrderItem, OrderStatus,
    OrderWithItems, Reservation, UserProfile,
};
use thiserror::Error;

/// Store errors surfaced to the engine
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of an atomic capacity-checked reservation insert
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    Created(Reservation),
    /// Slot already holds `capacity` reservations
    SlotFull,
    /// Same customer already holds this slot
    Duplicate,
}

/// Menu catalog (read only)
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Available items only, ordered by name
    async fn list_available(&self) -> StoreResult<Vec<MenuItem>>;

    /// Lookup regardless of availability (pricing needs vanished-but-present items)
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<MenuItem>>;

    /// Case-insensitive exact name match
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<MenuItem>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve(&self, external_id: &str) -> StoreResult<Option<UserProfile>>;
}

/// Persistent order store
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// The user's single Draft order, if any
    async fn find_draft(&self, user_id: i64) -> StoreResult<Option<Order>>;

    async fn create_draft(&self, user_id: i64, now: i64) -> StoreResult<Order>;

    async fn list_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>>;

    /// Fails with `NotFound` when the order is no longer a Draft
    async fn insert_item(&self, order_id: i64, item: &NewOrderItem) -> StoreResult<OrderItem>;

    async fn update_item(&self, item_id: i64, quantity: i32, notes: &str) -> StoreResult<()>;

    async fn delete_item(&self, item_id: i64) -> StoreResult<bool>;

    /// Hard delete (items cascade)
    async fn delete_order(&self, order_id: i64) -> StoreResult<bool>;

    /// Draft → Pending in place, attaching delivery fields
    ///
    /// `created_at` is reset to `now` (submission time).
    async fn promote_draft(
        &self,
        order_id: i64,
        delivery: &DeliveryDetails,
        now: i64,
    ) -> StoreResult<Order>;

    /// New Pending order straight from cart contents
    async fn create_order(
        &self,
        user_id: i64,
        delivery: &DeliveryDetails,
        items: &[NewOrderItem],
        now: i64,
    ) -> StoreResult<Order>;

    async fn set_status(&self, order_id: i64, status: OrderStatus, now: i64) -> StoreResult<()>;

    /// Pending orders created at or after `since`, newest first
    async fn find_pending_since(&self, user_id: i64, since: i64) -> StoreResult<Vec<Order>>;

    /// Most recent non-draft orders with their items, newest first
    async fn recent_orders(&self, user_id: i64, limit: u32) -> StoreResult<Vec<OrderWithItems>>;

    /// Delete Drafts whose `updated_at` is before `before`; returns count
    async fn delete_stale_drafts(&self, before: i64) -> StoreResult<u64>;
}

/// Persistent reservation store
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn count_at(&self, date: NaiveDate, time: NaiveTime) -> StoreResult<i64>;

    /// Customer name compared case-insensitively after trimming
    async fn find_by_slot(
        &self,
        customer_name: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> StoreResult<Option<Reservation>>;

    /// Capacity check, duplicate check and insert as one atomic step
    async fn insert_if_available(
        &self,
        reservation: &NewReservation,
        capacity: i64,
    ) -> StoreResult<SlotOutcome>;

    async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<Reservation>>;
}
