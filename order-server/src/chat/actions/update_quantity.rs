//! UpdateQuantity handler
//!
//! Quantity ≤ 0 means remove.

use async_trait::async_trait;

use super::RemoveItemAction;
use crate::chat::error::ChatError;
use crate::chat::merge::match_target;
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};

#[derive(Debug, Clone)]
pub struct UpdateQuantityAction {
    pub target: String,
    pub quantity: i32,
}

#[async_trait]
impl IntentHandler for UpdateQuantityAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        if self.quantity <= 0 {
            return RemoveItemAction {
                target: self.target.clone(),
            }
            .execute(ctx)
            .await;
        }

        let index = *match_target(&ctx.cart, &self.target)
            .first()
            .ok_or_else(|| ChatError::ItemNotFound(self.target.clone()))?;
        ctx.cart[index].quantity = self.quantity;
        let name = ctx.cart[index].name.clone();

        let subtotal = ctx.cart_subtotal().await?;
        Ok(IntentOutcome::updated(format!(
            "You now have {} x {name}. Your subtotal is now {subtotal:.2}.",
            self.quantity
        )))
    }
}
