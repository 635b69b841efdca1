//! Intent action implementations
//!
//! Each action implements the `IntentHandler` trait and handles
//! one specific intent.

use async_trait::async_trait;

use crate::chat::error::ChatError;
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};
use shared::intent::Intent;

mod add_items;
mod cancel_order;
mod filtered_menu;
mod order_history;
mod remove_item;
mod replace_item;
mod reserve_table;
mod show_summary;
mod submit_order;
mod update_quantity;

pub use add_items::AddItemsAction;
pub use cancel_order::{CancelOrderAction, CancelReport};
pub use filtered_menu::FilteredMenuAction;
pub use order_history::OrderHistoryAction;
pub use remove_item::RemoveItemAction;
pub use replace_item::ReplaceItemAction;
pub use reserve_table::ReserveTableAction;
pub use show_summary::{CartSummary, ShowSummaryAction, SummaryLine};
pub use submit_order::SubmitOrderAction;
pub use update_quantity::UpdateQuantityAction;

/// IntentAction enum - dispatches to concrete action implementations
pub enum IntentAction {
    AddItems(AddItemsAction),
    RemoveItem(RemoveItemAction),
    ReplaceItem(ReplaceItemAction),
    UpdateQuantity(UpdateQuantityAction),
    ShowSummary(ShowSummaryAction),
    SubmitOrder(SubmitOrderAction),
    CancelOrder(CancelOrderAction),
    ReserveTable(ReserveTableAction),
    OrderHistory(OrderHistoryAction),
    FilteredMenu(FilteredMenuAction),
}

/// Manual implementation of IntentHandler for IntentAction
#[async_trait]
impl IntentHandler for IntentAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        match self {
            IntentAction::AddItems(action) => action.execute(ctx).await,
            IntentAction::RemoveItem(action) => action.execute(ctx).await,
            IntentAction::ReplaceItem(action) => action.execute(ctx).await,
            IntentAction::UpdateQuantity(action) => action.execute(ctx).await,
            IntentAction::ShowSummary(action) => action.execute(ctx).await,
            IntentAction::SubmitOrder(action) => action.execute(ctx).await,
            IntentAction::CancelOrder(action) => action.execute(ctx).await,
            IntentAction::ReserveTable(action) => action.execute(ctx).await,
            IntentAction::OrderHistory(action) => action.execute(ctx).await,
            IntentAction::FilteredMenu(action) => action.execute(ctx).await,
        }
    }
}

/// Convert Intent to IntentAction
///
/// This is the ONLY place with a match on the intent tag.
impl From<Intent> for IntentAction {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Add { items } => IntentAction::AddItems(AddItemsAction { items }),
            Intent::Remove { target } => IntentAction::RemoveItem(RemoveItemAction { target }),
            Intent::Replace {
                target,
                replacement,
            } => IntentAction::ReplaceItem(ReplaceItemAction {
                target,
                replacement,
            }),
            Intent::UpdateQuantity { target, quantity } => {
                IntentAction::UpdateQuantity(UpdateQuantityAction { target, quantity })
            }
            Intent::ShowSummary => IntentAction::ShowSummary(ShowSummaryAction),
            Intent::Submit {
                delivery_address,
                customer_name,
                phone_number,
            } => IntentAction::SubmitOrder(SubmitOrderAction {
                delivery_address,
                customer_name,
                phone_number,
            }),
            Intent::Cancel => IntentAction::CancelOrder(CancelOrderAction),
            Intent::Reserve(spec) => IntentAction::ReserveTable(ReserveTableAction { spec }),
            Intent::History { limit } => IntentAction::OrderHistory(OrderHistoryAction { limit }),
            Intent::FilteredMenu(filter) => {
                IntentAction::FilteredMenu(FilteredMenuAction { filter })
            }
        }
    }
}
