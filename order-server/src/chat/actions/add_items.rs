//! Add handler
//!
//! Each requested item is resolved independently against the available
//! catalog; unresolved ones are skipped and listed in the diagnostics.

use async_trait::async_trait;
use shared::intent::RequestedItem;
use shared::models::CartLine;

use crate::chat::error::ChatError;
use crate::chat::merge::{merge_line, requested_notes};
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};

#[derive(Debug, Clone)]
pub struct AddItemsAction {
    pub items: Vec<RequestedItem>,
}

#[async_trait]
impl IntentHandler for AddItemsAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        let mut added = Vec::new();
        let mut diagnostics = Vec::new();
        let mut missing = Vec::new();

        for req in &self.items {
            let quantity = req.quantity.unwrap_or(1);
            if quantity <= 0 {
                diagnostics.push(format!("Skipped {}: quantity must be positive", req.label()));
                continue;
            }

            let Some(item) = ctx.resolve_item(req).await? else {
                diagnostics.push(format!("Item not found: {}", req.label()));
                missing.push(req.label());
                continue;
            };

            merge_line(
                &mut ctx.cart,
                CartLine {
                    menu_item_id: item.id,
                    name: item.name.clone(),
                    size: req
                        .size
                        .as_deref()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                    notes: requested_notes(req),
                    quantity,
                    unit_price: item.price,
                },
            )?;
            added.push(format!("{quantity} x {}", item.name));
        }

        if added.is_empty() {
            let wanted = if missing.is_empty() {
                self.items
                    .iter()
                    .map(RequestedItem::label)
                    .collect::<Vec<_>>()
                    .join(", ")
            } else {
                missing.join(", ")
            };
            return Err(ChatError::ItemNotFound(wanted));
        }

        let subtotal = ctx.cart_subtotal().await?;
        let mut reply = format!("Added {}. Your subtotal is now {subtotal:.2}.", added.join(", "));
        if !missing.is_empty() {
            reply.push_str(&format!(" I couldn't find: {}.", missing.join(", ")));
        }

        Ok(IntentOutcome::updated(reply).with_diagnostics(diagnostics))
    }
}
