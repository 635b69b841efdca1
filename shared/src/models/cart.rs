//! Cart Model
//!
//! 会话购物车中的一行。购物车本身只存在于内存 (SessionStore)，
//! 持久化时转换为 Draft 订单的 [`OrderItem`](super::OrderItem)。

use serde::{Deserialize, Serialize};

/// One line of a conversation cart
///
/// `notes` is always stored normalized (trimmed, lowercase). Two lines with the
/// same `menu_item_id` and `notes` never coexist in one cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub quantity: i32,
    /// Catalog price when the line was last touched (display only)
    pub unit_price: f64,
}
