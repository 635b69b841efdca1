//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, price, description, is_available";

pub async fn find_available(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item WHERE is_available = 1 ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item WHERE lower(name) = lower(?) ORDER BY id LIMIT 1"
    ))
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO menu_item (name, price, description, is_available) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.price)
    .bind(&data.description)
    .bind(data.is_available)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::memory_pool;

    #[tokio::test]
    async fn test_seeded_catalog_lookup() {
        let pool = memory_pool().await;
        let pizza = find_by_name(&pool, "pizza").await.unwrap().unwrap();
        assert_eq!(pizza.price, 10.0);
        assert!(pizza.is_available);
        assert!(find_by_name(&pool, "Kebab").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_and_availability() {
        let pool = memory_pool().await;
        let item = create(
            &pool,
            MenuItemCreate {
                name: "Knafeh".into(),
                price: 12.5,
                description: "Cheese, semolina, syrup".into(),
                is_available: false,
            },
        )
        .await
        .unwrap();

        assert!(find_by_id(&pool, item.id).await.unwrap().is_some());
        let available = find_available(&pool).await.unwrap();
        assert!(available.iter().all(|m| m.id != item.id));
    }
}
