//! Remove handler
//!
//! Removes every line the target refers to (see `match_target`).
//! An empty cart afterwards is valid; the flush then deletes the draft.

use async_trait::async_trait;

use crate::chat::error::ChatError;
use crate::chat::merge::match_target;
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};

#[derive(Debug, Clone)]
pub struct RemoveItemAction {
    pub target: String,
}

#[async_trait]
impl IntentHandler for RemoveItemAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        let matched = match_target(&ctx.cart, &self.target);
        if matched.is_empty() {
            return Err(ChatError::ItemNotFound(self.target.clone()));
        }

        let mut removed = Vec::with_capacity(matched.len());
        let mut index = 0;
        ctx.cart.retain(|line| {
            let keep = !matched.contains(&index);
            if !keep {
                removed.push(line.name.clone());
            }
            index += 1;
            keep
        });

        let reply = if ctx.cart.is_empty() {
            format!("Removed {}. Your cart is now empty.", removed.join(" and "))
        } else {
            let subtotal = ctx.cart_subtotal().await?;
            format!(
                "Removed {}. Your subtotal is now {subtotal:.2}.",
                removed.join(" and ")
            )
        };
        Ok(IntentOutcome::updated(reply))
    }
}
