//! Menu Model

use serde::{Deserialize, Serialize};

/// Menu item entity (菜单项)
///
/// `description` is free text; ingredient filters match against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    /// Current catalog price
    pub price: f64,
    pub description: String,
    pub is_available: bool,
}

/// Create menu item payload (seeding / admin import)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}
