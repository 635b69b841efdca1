//! Submit handler
//!
//! Delegates to `OrderReconciler::promote_to_order`; the session entry is
//! cleared only when the order was placed.

use async_trait::async_trait;

use crate::chat::error::ChatError;
use crate::chat::reconciler::SubmitRequest;
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};

#[derive(Debug, Clone, Default)]
pub struct SubmitOrderAction {
    pub delivery_address: Option<String>,
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
}

#[async_trait]
impl IntentHandler for SubmitOrderAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        if ctx.cart.is_empty() {
            return Err(ChatError::EmptyOrder);
        }

        let submitted = ctx
            .reconciler()
            .promote_to_order(
                &ctx.key,
                SubmitRequest {
                    address: self.delivery_address.as_deref(),
                    customer_name: self.customer_name.as_deref(),
                    phone_number: self.phone_number.as_deref(),
                },
            )
            .await?;

        let reply = format!(
            "Your order #{} has been placed. Subtotal {:.2}, delivery {:.2}, total {:.2}.",
            submitted.order_id, submitted.subtotal, submitted.delivery_fee, submitted.total
        );
        Ok(IntentOutcome::cleared(reply).with_data(&submitted))
    }
}
