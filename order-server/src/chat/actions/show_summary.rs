//! ShowSummary handler (read only)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::error::ChatError;
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};
use crate::pricing::calculator::{current_prices, line_total, priced_total};

/// One itemized summary line, priced from the live catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub menu_item_id: i64,
    pub name: String,
    pub notes: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub lines: Vec<SummaryLine>,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ShowSummaryAction;

#[async_trait]
impl IntentHandler for ShowSummaryAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        if ctx.cart.is_empty() {
            return Ok(IntentOutcome::unchanged("Your cart is empty."));
        }

        let ids: Vec<i64> = ctx.cart.iter().map(|l| l.menu_item_id).collect();
        let prices = current_prices(&ids, ctx.services.catalog.as_ref()).await?;

        let lines: Vec<SummaryLine> = ctx
            .cart
            .iter()
            .map(|line| {
                let unit_price = prices.get(&line.menu_item_id).copied().unwrap_or(0.0);
                SummaryLine {
                    menu_item_id: line.menu_item_id,
                    name: line.name.clone(),
                    notes: line.notes.clone(),
                    quantity: line.quantity,
                    unit_price,
                    line_total: line_total(unit_price, line.quantity),
                }
            })
            .collect();
        let subtotal = priced_total(
            ctx.cart.iter().map(|l| (l.menu_item_id, l.quantity)),
            &prices,
        );

        let mut reply = String::from("Your order:");
        for line in &lines {
            reply.push_str(&format!("\n- {} x {}", line.quantity, line.name));
            if !line.notes.is_empty() {
                reply.push_str(&format!(" ({})", line.notes));
            }
            reply.push_str(&format!(": {:.2}", line.line_total));
        }
        reply.push_str(&format!("\nSubtotal: {subtotal:.2}"));

        Ok(IntentOutcome::unchanged(reply).with_data(&CartSummary { lines, subtotal }))
    }
}
