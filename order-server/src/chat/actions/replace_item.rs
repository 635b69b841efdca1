//! Replace handler
//!
//! Acts on the first matched line. The replacement keeps the old quantity
//! unless one is given, takes the old line's position, and merges into an
//! identical line if the cart already has one.

use async_trait::async_trait;
use shared::intent::RequestedItem;
use shared::models::CartLine;

use crate::chat::error::ChatError;
use crate::chat::merge::{match_target, merge_line, requested_notes, same_line};
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};

#[derive(Debug, Clone)]
pub struct ReplaceItemAction {
    pub target: String,
    pub replacement: RequestedItem,
}

#[async_trait]
impl IntentHandler for ReplaceItemAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        let index = *match_target(&ctx.cart, &self.target)
            .first()
            .ok_or_else(|| ChatError::ItemNotFound(self.target.clone()))?;

        let item = ctx
            .resolve_item(&self.replacement)
            .await?
            .ok_or_else(|| ChatError::ReplacementUnavailable(self.replacement.label()))?;

        let old = ctx.cart.remove(index);
        let line = CartLine {
            menu_item_id: item.id,
            name: item.name.clone(),
            size: self
                .replacement
                .size
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            notes: requested_notes(&self.replacement),
            quantity: self
                .replacement
                .quantity
                .filter(|q| *q > 0)
                .unwrap_or(old.quantity),
            unit_price: item.price,
        };
        let quantity = line.quantity;

        if ctx.cart.iter().any(|existing| same_line(existing, &line)) {
            merge_line(&mut ctx.cart, line)?;
        } else {
            ctx.cart.insert(index, line);
        }

        let subtotal = ctx.cart_subtotal().await?;
        Ok(IntentOutcome::updated(format!(
            "Replaced {} with {quantity} x {}. Your subtotal is now {subtotal:.2}.",
            old.name, item.name
        )))
    }
}
