//! Draft 清理任务
//!
//! 周期性删除长时间未更新的 Draft 订单（默认 48 小时）。
//! 对话核心容忍 Draft 随时消失，见 `OrderReconciler`。
//!
//! 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。

use shared::util::now_millis;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::db::{OrderStore, StoreResult};

pub struct DraftSweeper {
    orders: Arc<dyn OrderStore>,
    retention: Duration,
    interval: Duration,
    shutdown: CancellationToken,
}

impl DraftSweeper {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        retention: Duration,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            orders,
            retention,
            interval,
            shutdown,
        }
    }

    /// 主循环：立即清理一次 → 按间隔触发，直到 shutdown
    pub async fn run(self) {
        tracing::info!(
            retention_hours = self.retention.as_secs() / 3600,
            interval_secs = self.interval.as_secs(),
            "Draft sweeper started"
        );

        loop {
            if let Err(e) = self.sweep_once(now_millis()).await {
                tracing::error!(error = %e, "Draft sweep failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Draft sweeper received shutdown signal");
                    break;
                }
            }
        }

        tracing::info!("Draft sweeper stopped");
    }

    /// Delete drafts last touched before `now - retention`
    pub async fn sweep_once(&self, now: i64) -> StoreResult<u64> {
        let retention_ms = i64::try_from(self.retention.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now.saturating_sub(retention_ms);
        let deleted = self.orders.delete_stale_drafts(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, "Stale draft orders removed");
        }
        Ok(deleted)
    }
}
