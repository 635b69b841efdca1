//! History handler (read only)

use async_trait::async_trait;

use crate::chat::error::ChatError;
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};
use crate::orders::history;

#[derive(Debug, Clone, Default)]
pub struct OrderHistoryAction {
    pub limit: Option<u32>,
}

#[async_trait]
impl IntentHandler for OrderHistoryAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        let user = ctx.resolve_user().await?;
        let limit = ctx.services.policy.history_limit(self.limit);
        let summaries = history::recent_summaries(ctx.services, user.id, limit).await?;

        if summaries.is_empty() {
            return Ok(IntentOutcome::unchanged("You have no previous orders."));
        }

        let mut reply = format!("Your last {} order(s):", summaries.len());
        for summary in &summaries {
            reply.push_str(&format!("\n- {}", summary.headline()));
        }
        Ok(IntentOutcome::unchanged(reply).with_data(&summaries))
    }
}
