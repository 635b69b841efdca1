//! Reservation Model

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Table reservation (订座)
///
/// A slot is the exact `(date, time)` pair; capacity is counted per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub customer_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i32,
    /// Unix millis
    pub created_at: i64,
}

/// Reservation to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub user_id: i64,
    pub customer_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i32,
    pub created_at: i64,
}
