use std::sync::Arc;

use crate::chat::{ChatServices, IntentDispatcher};
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerError, StorageKind};
use crate::db::{DbService, MemoryStore};
use crate::orders::DraftSweeper;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，作为 axum `State` 注入每个处理器。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | dispatcher | Arc<IntentDispatcher> | 对话引擎（含全部存储协作者） |
/// | db | Option<DbService> | SQLite 连接池（内存存储时为 None） |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub dispatcher: Arc<IntentDispatcher>,
    pub db: Option<DbService>,
}

impl ServerState {
    /// 直接包装现成的服务（测试用）
    pub fn new(config: Config, services: ChatServices) -> Self {
        Self {
            config,
            dispatcher: Arc::new(IntentDispatcher::new(services)),
            db: None,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 存储 (SQLite 或内存)
    /// 3. 对话服务 (营业规则、配送区域、超时)
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            ServerError::Config(format!("Cannot create work dir {}: {e}", config.work_dir))
        })?;

        let (services, db) = match config.storage {
            StorageKind::Sqlite => {
                let db = DbService::new(&config.database_path).await?;
                tracing::info!(path = %config.database_path, "Using SQLite storage");
                (ChatServices::from_store(Arc::new(db.store())), Some(db))
            }
            StorageKind::Memory => {
                tracing::warn!("Using in-memory storage, data is lost on restart");
                (ChatServices::from_store(Arc::new(MemoryStore::seeded())), None)
            }
        };

        let services = services
            .with_policy(config.chat_policy())
            .with_zones(config.delivery_zones.clone())
            .with_store_timeout(config.store_timeout());

        Ok(Self {
            config: config.clone(),
            dispatcher: Arc::new(IntentDispatcher::new(services)),
            db,
        })
    }

    pub fn services(&self) -> &ChatServices {
        self.dispatcher.services()
    }

    /// 启动后台任务，返回管理器供关闭时使用
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let sweeper = DraftSweeper::new(
            self.services().orders.clone(),
            self.config.draft_retention(),
            self.config.draft_sweep_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("draft_sweeper", TaskKind::Periodic, sweeper.run());

        tasks.log_summary();
        tasks
    }
}
