//! Reservation Repository

use super::RepoResult;
use crate::db::store::SlotOutcome;
use chrono::{NaiveDate, NaiveTime};
use shared::models::{NewReservation, Reservation};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, user_id, customer_name, date, time, party_size, created_at";

pub async fn count_at(pool: &SqlitePool, date: NaiveDate, time: NaiveTime) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reservation WHERE date = ? AND time = ?",
    )
    .bind(date)
    .bind(time)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn find_by_slot(
    pool: &SqlitePool,
    customer_name: &str,
    date: NaiveDate,
    time: NaiveTime,
) -> RepoResult<Option<Reservation>> {
    let row = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservation \
         WHERE date = ? AND time = ? AND lower(trim(customer_name)) = lower(trim(?)) LIMIT 1"
    ))
    .bind(date)
    .bind(time)
    .bind(customer_name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Reservation>> {
    let rows = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservation WHERE user_id = ? ORDER BY date, time"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Capacity + duplicate check + insert inside one transaction
///
/// The INSERT re-checks the slot count itself, so a writer that slipped in
/// after the first read still cannot push the slot past `capacity`.
pub async fn insert_if_available(
    pool: &SqlitePool,
    new: &NewReservation,
    capacity: i64,
) -> RepoResult<SlotOutcome> {
    let mut tx = pool.begin().await?;

    let taken = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reservation WHERE date = ? AND time = ?",
    )
    .bind(new.date)
    .bind(new.time)
    .fetch_one(&mut *tx)
    .await?;
    if taken >= capacity {
        return Ok(SlotOutcome::SlotFull);
    }

    let duplicate = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reservation \
         WHERE date = ? AND time = ? AND lower(trim(customer_name)) = lower(trim(?))",
    )
    .bind(new.date)
    .bind(new.time)
    .bind(&new.customer_name)
    .fetch_one(&mut *tx)
    .await?;
    if duplicate > 0 {
        return Ok(SlotOutcome::Duplicate);
    }

    let inserted = sqlx::query_as::<_, Reservation>(&format!(
        "INSERT INTO reservation (user_id, customer_name, date, time, party_size, created_at) \
         SELECT ?, ?, ?, ?, ?, ? \
         WHERE (SELECT COUNT(*) FROM reservation WHERE date = ? AND time = ?) < ? \
         RETURNING {COLUMNS}"
    ))
    .bind(new.user_id)
    .bind(new.customer_name.trim())
    .bind(new.date)
    .bind(new.time)
    .bind(new.party_size)
    .bind(new.created_at)
    .bind(new.date)
    .bind(new.time)
    .bind(capacity)
    .fetch_optional(&mut *tx)
    .await?;

    match inserted {
        Some(reservation) => {
            tx.commit().await?;
            Ok(SlotOutcome::Created(reservation))
        }
        None => Ok(SlotOutcome::SlotFull),
    }
}
