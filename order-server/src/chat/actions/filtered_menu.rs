//! FilteredMenu handler (read only)
//!
//! Include/exclude ingredients are matched against name + description.

use async_trait::async_trait;
use shared::intent::IngredientFilter;
use shared::models::MenuItem;

use crate::chat::error::ChatError;
use crate::chat::traits::{IntentContext, IntentHandler, IntentOutcome};

#[derive(Debug, Clone, Default)]
pub struct FilteredMenuAction {
    pub filter: IngredientFilter,
}

impl FilteredMenuAction {
    fn accepts(&self, item: &MenuItem) -> bool {
        self.filter
            .matches(&format!("{} {}", item.name, item.description))
    }
}

#[async_trait]
impl IntentHandler for FilteredMenuAction {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError> {
        let items: Vec<MenuItem> = ctx
            .services
            .catalog
            .list_available()
            .await?
            .into_iter()
            .filter(|item| self.accepts(item))
            .collect();

        if items.is_empty() {
            return Ok(IntentOutcome::unchanged(
                "No dishes on the menu match those ingredients.",
            ));
        }

        let mut reply = if self.filter.is_empty() {
            String::from("Here is our menu:")
        } else {
            String::from("These dishes match:")
        };
        for item in &items {
            reply.push_str(&format!("\n- {} ({:.2})", item.name, item.price));
            if !item.description.is_empty() {
                reply.push_str(&format!(": {}", item.description));
            }
        }
        Ok(IntentOutcome::unchanged(reply).with_data(&items))
    }
}
