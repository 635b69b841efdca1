//! User Repository

use super::RepoResult;
use shared::models::UserProfile;
use sqlx::SqlitePool;

pub async fn find_by_external_id(
    pool: &SqlitePool,
    external_id: &str,
) -> RepoResult<Option<UserProfile>> {
    let user = sqlx::query_as::<_, UserProfile>(
        "SELECT id, external_id, name, phone FROM app_user WHERE external_id = ?",
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::memory_pool;

    #[tokio::test]
    async fn test_resolve_demo_user() {
        let pool = memory_pool().await;
        let demo = find_by_external_id(&pool, "demo").await.unwrap().unwrap();
        assert_eq!(demo.name, "Demo Customer");
        assert!(find_by_external_id(&pool, "ghost").await.unwrap().is_none());
    }
}
