use chrono::Weekday;
use chrono_tz::Tz;
use std::time::Duration;

use crate::chat::ChatPolicy;
use crate::pricing::DeliveryZones;
use crate::utils::time::{parse_timezone, parse_weekday};

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Sqlite,
    /// 进程内存储，重启即丢失（演示 / 测试）
    Memory,
}

impl StorageKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// 服务器配置 - 点餐服务的所有配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录（数据库、日志） |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别（`RUST_LOG` 优先） |
/// | LOG_JSON | false | JSON 日志 |
/// | STORAGE | sqlite | `sqlite` / `memory` |
/// | DATABASE_PATH | <WORK_DIR>/orders.db | SQLite 文件 |
/// | TIMEZONE | Asia/Hebron | 营业时区 |
/// | CLOSED_WEEKDAY | Fri | 每周闭店日 |
/// | TABLE_CAPACITY | 7 | 每个时段可预订桌数 |
/// | MAX_PARTY_SIZE | 10 | 单次预订最大人数 |
/// | CANCEL_WINDOW_SECS | 180 | 提交后可取消时长 |
/// | DRAFT_RETENTION_HOURS | 48 | Draft 保留时长 |
/// | DRAFT_SWEEP_INTERVAL_SECS | 3600 | Draft 清理间隔 |
/// | HISTORY_LIMIT | 5 | 历史订单默认条数 |
/// | STORE_TIMEOUT_MS | 5000 | 单个 turn 超时 |
/// | DELIVERY_ZONES | (内置三区) | JSON: `[{name, keywords, fee}]` |
///
/// # 示例
///
/// ```ignore
/// STORAGE=memory HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub storage: StorageKind,
    pub database_path: String,

    // === 营业规则 ===
    pub timezone: Tz,
    pub closed_weekday: Weekday,
    pub table_capacity: i64,
    pub max_party_size: i32,
    pub cancel_window_secs: u64,
    pub history_limit: u32,

    // === 后台任务 / 超时 ===
    pub draft_retention_hours: u64,
    pub draft_sweep_interval_secs: u64,
    pub store_timeout_ms: u64,

    pub delivery_zones: DeliveryZones,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析的变量使用默认值（非法值记 warning）。
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{}/orders.db", work_dir.trim_end_matches('/')));

        let storage = match std::env::var("STORAGE") {
            Ok(value) => StorageKind::parse(&value).unwrap_or_else(|| {
                tracing::warn!(value = %value, "Unknown STORAGE, using sqlite");
                StorageKind::Sqlite
            }),
            Err(_) => StorageKind::Sqlite,
        };

        let defaults = ChatPolicy::default();
        let timezone = match std::env::var("TIMEZONE") {
            Ok(name) => parse_timezone(&name).unwrap_or_else(|| {
                tracing::warn!(timezone = %name, "Unknown TIMEZONE, using default");
                defaults.timezone
            }),
            Err(_) => defaults.timezone,
        };
        let closed_weekday = match std::env::var("CLOSED_WEEKDAY") {
            Ok(day) => parse_weekday(&day).unwrap_or_else(|| {
                tracing::warn!(weekday = %day, "Unknown CLOSED_WEEKDAY, using default");
                defaults.closed_weekday
            }),
            Err(_) => defaults.closed_weekday,
        };

        let delivery_zones = match std::env::var("DELIVERY_ZONES") {
            Ok(json) => DeliveryZones::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid DELIVERY_ZONES, using default table");
                DeliveryZones::default()
            }),
            Err(_) => DeliveryZones::default(),
        };

        Self {
            work_dir,
            http_port: env_parse("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            storage,
            database_path,
            timezone,
            closed_weekday,
            table_capacity: env_parse("TABLE_CAPACITY", defaults.table_capacity),
            max_party_size: env_parse("MAX_PARTY_SIZE", defaults.max_party_size),
            cancel_window_secs: env_parse("CANCEL_WINDOW_SECS", 180),
            history_limit: env_parse("HISTORY_LIMIT", defaults.history_default),
            draft_retention_hours: env_parse("DRAFT_RETENTION_HOURS", 48),
            draft_sweep_interval_secs: env_parse("DRAFT_SWEEP_INTERVAL_SECS", 3600),
            store_timeout_ms: env_parse("STORE_TIMEOUT_MS", 5000),
            delivery_zones,
        }
    }

    /// 测试用：内存存储 + 指定工作目录
    pub fn for_memory(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.storage = StorageKind::Memory;
        config
    }

    /// 业务规则
    pub fn chat_policy(&self) -> ChatPolicy {
        let defaults = ChatPolicy::default();
        ChatPolicy {
            closed_weekday: self.closed_weekday,
            table_capacity: self.table_capacity,
            max_party_size: self.max_party_size,
            cancel_window_ms: i64::try_from(self.cancel_window_secs.saturating_mul(1000))
                .unwrap_or(defaults.cancel_window_ms),
            history_default: self.history_limit.clamp(1, defaults.history_max),
            history_max: defaults.history_max,
            timezone: self.timezone,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn draft_retention(&self) -> Duration {
        Duration::from_secs(self.draft_retention_hours.saturating_mul(3600))
    }

    pub fn draft_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.draft_sweep_interval_secs.max(1))
    }

    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir.trim_end_matches('/'))
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_parse() {
        assert_eq!(StorageKind::parse("SQLite"), Some(StorageKind::Sqlite));
        assert_eq!(StorageKind::parse(" memory "), Some(StorageKind::Memory));
        assert_eq!(StorageKind::parse("redis"), None);
    }

    #[test]
    fn test_chat_policy_from_config() {
        let mut config = Config::for_memory("/tmp/orders-test");
        config.cancel_window_secs = 60;
        config.history_limit = 50;
        config.closed_weekday = Weekday::Mon;

        let policy = config.chat_policy();
        assert_eq!(policy.cancel_window_ms, 60_000);
        assert_eq!(policy.history_default, 20);
        assert_eq!(policy.closed_weekday, Weekday::Mon);
        assert_eq!(config.log_dir(), "/tmp/orders-test/logs");
    }
}
