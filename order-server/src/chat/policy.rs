//! Business rules for the chat engine

use chrono::Weekday;
use chrono_tz::Tz;

/// 营业规则（由 `Config::chat_policy` 构建）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatPolicy {
    /// Weekly closure day (no reservations)
    pub closed_weekday: Weekday,
    /// Reservations per (date, time) slot
    pub table_capacity: i64,
    pub max_party_size: i32,
    /// Pending orders younger than this can still be cancelled
    pub cancel_window_ms: i64,
    pub history_default: u32,
    pub history_max: u32,
    /// Business timezone ("today", closure day)
    pub timezone: Tz,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            closed_weekday: Weekday::Fri,
            table_capacity: 7,
            max_party_size: 10,
            cancel_window_ms: 3 * 60 * 1000,
            history_default: 5,
            history_max: 20,
            timezone: chrono_tz::Asia::Hebron,
        }
    }
}

impl ChatPolicy {
    /// Requested history size clamped to `1..=history_max`
    pub fn history_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.history_default)
            .clamp(1, self.history_max.max(1))
    }
}
