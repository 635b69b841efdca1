//! Order Repository
//!
//! `customer_order` + `order_item`。订单行不存价格，读取时按当前菜单重新计价。

use super::{RepoError, RepoResult};
use shared::models::{
    DeliveryDetails, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems,
};
use sqlx::SqlitePool;

const ORDER_COLUMNS: &str =
    "id, user_id, status, delivery_address, customer_name, phone_number, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    status: String,
    delivery_address: Option<String>,
    customer_name: Option<String>,
    phone_number: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            status: row.status.parse().map_err(RepoError::Database)?,
            delivery_address: row.delivery_address,
            customer_name: row.customer_name,
            phone_number: row.phone_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM customer_order WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(Order::try_from).transpose()
}

pub async fn find_draft(pool: &SqlitePool, user_id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM customer_order WHERE user_id = ? AND status = ? LIMIT 1"
    ))
    .bind(user_id)
    .bind(OrderStatus::Draft.as_str())
    .fetch_optional(pool)
    .await?;
    row.map(Order::try_from).transpose()
}

pub async fn create_draft(pool: &SqlitePool, user_id: i64, now: i64) -> RepoResult<Order> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customer_order (user_id, status, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(OrderStatus::Draft.as_str())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create draft order".into()))
}

pub async fn list_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, menu_item_id, quantity, notes FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Insert a line into a Draft; `NotFound` if the order is gone or no longer a Draft
pub async fn insert_item(
    pool: &SqlitePool,
    order_id: i64,
    item: &NewOrderItem,
) -> RepoResult<OrderItem> {
    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_item (order_id, menu_item_id, quantity, notes) \
         SELECT id, ?, ?, ? FROM customer_order WHERE id = ? AND status = ? \
         RETURNING id",
    )
    .bind(item.menu_item_id)
    .bind(item.quantity)
    .bind(&item.notes)
    .bind(order_id)
    .bind(OrderStatus::Draft.as_str())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Draft order {order_id}")))?;

    touch_order(&mut tx, order_id).await?;
    tx.commit().await?;

    Ok(OrderItem {
        id,
        order_id,
        menu_item_id: item.menu_item_id,
        quantity: item.quantity,
        notes: item.notes.clone(),
    })
}

pub async fn update_item(
    pool: &SqlitePool,
    item_id: i64,
    quantity: i32,
    notes: &str,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE order_item SET quantity = ?, notes = ? WHERE id = ?")
        .bind(quantity)
        .bind(notes)
        .bind(item_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order item {item_id}")));
    }
    sqlx::query(
        "UPDATE customer_order SET updated_at = ? \
         WHERE id = (SELECT order_id FROM order_item WHERE id = ?)",
    )
    .bind(shared::util::now_millis())
    .bind(item_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_item(pool: &SqlitePool, item_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM order_item WHERE id = ?")
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete_order(pool: &SqlitePool, order_id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM order_item WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM customer_order WHERE id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn promote_draft(
    pool: &SqlitePool,
    order_id: i64,
    delivery: &DeliveryDetails,
    now: i64,
) -> RepoResult<Order> {
    let rows = sqlx::query(
        "UPDATE customer_order \
         SET status = ?, delivery_address = ?, customer_name = ?, phone_number = ?, \
             created_at = ?, updated_at = ? \
         WHERE id = ? AND status = ?",
    )
    .bind(OrderStatus::Pending.as_str())
    .bind(&delivery.address)
    .bind(&delivery.customer_name)
    .bind(&delivery.phone_number)
    .bind(now)
    .bind(now)
    .bind(order_id)
    .bind(OrderStatus::Draft.as_str())
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Draft order {order_id}")));
    }
    find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {order_id}")))
}

pub async fn create_order(
    pool: &SqlitePool,
    user_id: i64,
    delivery: &DeliveryDetails,
    items: &[NewOrderItem],
    now: i64,
) -> RepoResult<Order> {
    let mut tx = pool.begin().await?;

    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customer_order \
         (user_id, status, delivery_address, customer_name, phone_number, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(OrderStatus::Pending.as_str())
    .bind(&delivery.address)
    .bind(&delivery.customer_name)
    .bind(&delivery.phone_number)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO order_item (order_id, menu_item_id, quantity, notes) VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .bind(&item.notes)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

pub async fn set_status(
    pool: &SqlitePool,
    order_id: i64,
    status: OrderStatus,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE customer_order SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now)
        .bind(order_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {order_id}")));
    }
    Ok(())
}

pub async fn find_pending_since(
    pool: &SqlitePool,
    user_id: i64,
    since: i64,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM customer_order \
         WHERE user_id = ? AND status = ? AND created_at >= ? \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .bind(OrderStatus::Pending.as_str())
    .bind(since)
    .fetch_all(pool)
    .await?;
    into_orders(rows)
}

pub async fn recent_orders(
    pool: &SqlitePool,
    user_id: i64,
    limit: u32,
) -> RepoResult<Vec<OrderWithItems>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM customer_order \
         WHERE user_id = ? AND status <> ? \
         ORDER BY created_at DESC, id DESC LIMIT ?"
    ))
    .bind(user_id)
    .bind(OrderStatus::Draft.as_str())
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    let mut result = Vec::with_capacity(rows.len());
    for order in into_orders(rows)? {
        let items = list_items(pool, order.id).await?;
        result.push(OrderWithItems { order, items });
    }
    Ok(result)
}

pub async fn delete_stale_drafts(pool: &SqlitePool, before: i64) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "DELETE FROM order_item WHERE order_id IN \
         (SELECT id FROM customer_order WHERE status = ? AND updated_at < ?)",
    )
    .bind(OrderStatus::Draft.as_str())
    .bind(before)
    .execute(&mut *tx)
    .await?;
    let rows = sqlx::query("DELETE FROM customer_order WHERE status = ? AND updated_at < ?")
        .bind(OrderStatus::Draft.as_str())
        .bind(before)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected())
}

async fn touch_order(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_id: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE customer_order SET updated_at = ? WHERE id = ?")
        .bind(shared::util::now_millis())
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{add_user, memory_pool};

    fn line(menu_item_id: i64, quantity: i32, notes: &str) -> NewOrderItem {
        NewOrderItem {
            menu_item_id,
            quantity,
            notes: notes.to_string(),
        }
    }

    fn delivery() -> DeliveryDetails {
        DeliveryDetails {
            address: "Birzeit, main street".into(),
            customer_name: "Lina".into(),
            phone_number: Some("0599".into()),
        }
    }

    #[tokio::test]
    async fn test_draft_lifecycle() {
        let pool = memory_pool().await;
        let user_id = add_user(&pool, "u1", "Lina").await;

        assert!(find_draft(&pool, user_id).await.unwrap().is_none());
        let draft = create_draft(&pool, user_id, 1_000).await.unwrap();
        assert_eq!(draft.status, OrderStatus::Draft);

        let item = insert_item(&pool, draft.id, &line(1, 2, "")).await.unwrap();
        update_item(&pool, item.id, 3, "no onions").await.unwrap();
        let items = list_items(&pool, draft.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].notes, "no onions");

        let promoted = promote_draft(&pool, draft.id, &delivery(), 2_000).await.unwrap();
        assert_eq!(promoted.status, OrderStatus::Pending);
        assert_eq!(promoted.delivery_address.as_deref(), Some("Birzeit, main street"));
        assert!(find_draft(&pool, user_id).await.unwrap().is_none());

        // No longer a draft
        let err = insert_item(&pool, draft.id, &line(2, 1, "")).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_one_draft_per_user_index() {
        let pool = memory_pool().await;
        let user_id = add_user(&pool, "u1", "Lina").await;
        create_draft(&pool, user_id, 1).await.unwrap();
        let err = create_draft(&pool, user_id, 2).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_pending_and_history_queries() {
        let pool = memory_pool().await;
        let user_id = add_user(&pool, "u1", "Lina").await;

        let old = create_order(&pool, user_id, &delivery(), &[line(1, 1, "")], 1_000)
            .await
            .unwrap();
        let fresh = create_order(&pool, user_id, &delivery(), &[line(2, 2, "")], 9_000)
            .await
            .unwrap();
        create_draft(&pool, user_id, 10_000).await.unwrap();

        let pending = find_pending_since(&pool, user_id, 5_000).await.unwrap();
        assert_eq!(pending.iter().map(|o| o.id).collect::<Vec<_>>(), vec![fresh.id]);

        set_status(&pool, old.id, OrderStatus::Cancelled, 11_000)
            .await
            .unwrap();
        let history = recent_orders(&pool, user_id, 5).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].order.id, fresh.id);
        assert_eq!(history[0].items[0].quantity, 2);
        assert_eq!(history[1].order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_delete_stale_drafts() {
        let pool = memory_pool().await;
        let stale_user = add_user(&pool, "old", "Old").await;
        let draft = create_draft(&pool, stale_user, 1_000).await.unwrap();
        sqlx::query("INSERT INTO order_item (order_id, menu_item_id, quantity, notes) VALUES (?, 1, 1, '')")
            .bind(draft.id)
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(delete_stale_drafts(&pool, 5_000).await.unwrap(), 1);
        assert!(find_by_id(&pool, draft.id).await.unwrap().is_none());
        assert!(list_items(&pool, draft.id).await.unwrap().is_empty());
    }
}
