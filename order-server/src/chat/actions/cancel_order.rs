//! Cancel handler
//!
//! Two independent scopes:
//! - the current Draft, always cancellable
//! - the newest Pending order created inside the cancel window
//!
//! Other Pending orders are left alone and reported, split into those
//! placed before the window and older ones still inside it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::OrderStatus;

use crate::chat::error::ChatError;
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};
use crate::db::StoreError;

/// Pending orders inspected for the report
const RECENT_SCAN: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReport {
    pub draft_cancelled: Option<i64>,
    pub pending_cancelled: Option<i64>,
    /// Pending orders placed before the cancel window
    pub outside_window: Vec<i64>,
    /// Pending orders inside the window but older than the cancelled one
    pub superseded: Vec<i64>,
}

fn order_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default)]
pub struct CancelOrderAction;

#[async_trait]
impl IntentHandler for CancelOrderAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        let Some(user) = ctx.find_user().await? else {
            // 匿名会话没有持久化订单，只清空购物车
            return Ok(IntentOutcome::cleared("Your cart has been cleared."));
        };

        let now = ctx.meta.now_millis;
        let orders = &ctx.services.orders;
        let mut report = CancelReport {
            draft_cancelled: ctx.reconciler().cancel_draft(user.id).await?,
            ..CancelReport::default()
        };

        let since = now - ctx.services.policy.cancel_window_ms;
        if let Some(latest) = orders.find_pending_since(user.id, since).await?.first() {
            match orders
                .set_status(latest.id, OrderStatus::Cancelled, now)
                .await
            {
                Ok(()) => report.pending_cancelled = Some(latest.id),
                Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let cancelled = report.pending_cancelled;
        let remaining = orders
            .recent_orders(user.id, RECENT_SCAN)
            .await?
            .into_iter()
            .map(|o| o.order)
            .filter(|o| o.status == OrderStatus::Pending)
            .filter(|o| Some(o.id) != cancelled);
        for order in remaining {
            if order.created_at >= since {
                report.superseded.push(order.id);
            } else {
                report.outside_window.push(order.id);
            }
        }

        tracing::info!(
            draft = ?report.draft_cancelled,
            pending = ?report.pending_cancelled,
            outside_window = report.outside_window.len(),
            superseded = report.superseded.len(),
            "Cancel processed"
        );

        let mut parts = Vec::new();
        if let Some(id) = report.draft_cancelled {
            parts.push(format!("Your open order #{id} has been cancelled."));
        }
        if let Some(id) = report.pending_cancelled {
            parts.push(format!("Your submitted order #{id} has been cancelled."));
        }
        if !report.superseded.is_empty() {
            parts.push(format!(
                "Order {} was kept: only your most recent order can be cancelled.",
                order_list(&report.superseded)
            ));
        }
        if !report.outside_window.is_empty() {
            parts.push(format!(
                "Order {} can no longer be cancelled because it was placed more than {} minutes ago.",
                order_list(&report.outside_window),
                ctx.services.policy.cancel_window_ms / 60_000
            ));
        }
        if parts.is_empty() {
            parts.push("There was nothing to cancel. Your cart has been cleared.".to_string());
        }

        Ok(IntentOutcome::cleared(parts.join(" ")).with_data(&report))
    }
}
