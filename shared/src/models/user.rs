//! User Model

use serde::{Deserialize, Serialize};

/// Customer profile as resolved by the user directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserProfile {
    /// Internal id
    pub id: i64,
    /// Id used by the chat front end / identity provider
    pub external_id: String,
    pub name: String,
    pub phone: Option<String>,
}
