//! Order Server - 对话式餐厅点餐后端
//!
//! 外部语言模型每轮对话产出一个工具调用 (`IntentPayload`)，本服务把它
//! 应用到会话购物车上，并和持久化的 Draft 订单、订座表保持一致。
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、后台任务、错误
//! ├── chat/          # 对话引擎：dispatcher、意图处理器、对账、订座
//! ├── pricing/       # 小计、配送区域费用
//! ├── orders/        # 历史订单投影、Draft 清理
//! ├── db/            # 存储接口 + SQLite / 内存实现
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、错误、时区
//! ```

pub mod api;
pub mod chat;
pub mod core;
pub mod db;
pub mod orders;
pub mod pricing;
pub mod utils;

// Re-export 公共类型
pub use chat::{ChatServices, IntentDispatcher, TurnMeta, TurnReply};
pub use core::{Config, Server, ServerState};
pub use db::{MemoryStore, SqliteStore};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 进程级初始化：`.env`、工作目录、日志
///
/// 返回的 guard 必须活到进程结束（文件日志的后台写线程）。
pub fn setup_environment(
    config: &Config,
) -> std::io::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    std::fs::create_dir_all(&config.work_dir)?;

    let log_dir = config.log_dir();
    let guard = init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        config.is_production().then_some(log_dir.as_str()),
    );

    if config.is_production() {
        match cleanup_old_logs(&log_dir, 14) {
            Ok(removed) if removed > 0 => tracing::info!(removed, "Old log files removed"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
        }
    }
    Ok(guard)
}

pub fn print_banner() {
    println!(
        r#"
   ____          __
  / __ \_______/ /__  _____
 / / / / ___/ __  / _ \/ ___/
/ /_/ / /  / /_/ /  __/ /
\____/_/   \__,_/\___/_/
    "#
    );
}
