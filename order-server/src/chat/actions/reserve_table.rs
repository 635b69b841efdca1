//! Reserve handler
//!
//! Validation failures short-circuit; the cart is never touched.

use async_trait::async_trait;
use shared::intent::ReservationSpec;

use crate::chat::error::ChatError;
use crate::chat::reservation::{ReservationAllocator, SlotRequest};
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};

#[derive(Debug, Clone)]
pub struct ReserveTableAction {
    pub spec: ReservationSpec,
}

#[async_trait]
impl IntentHandler for ReserveTableAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        let user = ctx.resolve_user().await?;
        let customer_name = self
            .spec
            .customer_name
            .clone()
            .unwrap_or_else(|| user.name.clone());

        let allocator =
            ReservationAllocator::new(ctx.services.reservations.as_ref(), &ctx.services.policy);
        let request = SlotRequest {
            user_id: user.id,
            customer_name,
            date: self.spec.date,
            time: self.spec.time,
            party_size: self.spec.party_size,
        };
        let reservation = allocator
            .allocate(&request, ctx.meta.today, ctx.meta.now_millis)
            .await?;
        let remaining = allocator.remaining(reservation.date, reservation.time).await?;

        let reply = format!(
            "Table for {} reserved on {} at {} under {}. {remaining} table(s) left for that time.",
            reservation.party_size,
            reservation.date,
            reservation.time.format("%H:%M"),
            reservation.customer_name
        );
        Ok(IntentOutcome::unchanged(reply).with_data(&reservation))
    }
}
