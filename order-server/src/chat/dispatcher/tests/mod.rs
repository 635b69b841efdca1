//! IntentDispatcher 场景测试
//!
//! 全部基于 `MemoryStore`，时钟固定在 2030-03-14 (周四) 12:00 UTC。

use super::*;
use crate::db::{MemoryStore, OrderStore};
use shared::intent::{IngredientFilter, RequestedItem, ReservationRequest};
use shared::models::{Order, OrderItem, OrderStatus};
use std::sync::Arc;

mod test_cancel;
mod test_cart;
mod test_reserve;
mod test_submit;

/// 2030-03-14T12:00:00Z, a Thursday
const NOW: i64 = 1_899_720_000_000;
const MINUTE: i64 = 60_000;

struct Harness {
    store: Arc<MemoryStore>,
    dispatcher: IntentDispatcher,
    user_id: i64,
    pizza: i64,
    tea: i64,
    chicken: i64,
    beef: i64,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let pizza = store
        .add_menu_item("Pizza", 10.0, "Tomato sauce, mozzarella, basil")
        .id;
    let tea = store.add_menu_item("Tea", 5.0, "Black tea with fresh mint").id;
    let chicken = store
        .add_menu_item("Chicken Kebab", 18.0, "Grilled chicken, onions, garlic sauce")
        .id;
    let beef = store
        .add_menu_item("Beef Kebab", 22.0, "Minced beef, parsley, onions, tahini")
        .id;
    store.add_menu_item("Falafel Wrap", 8.0, "Chickpeas, tahini, pickles, tomato");
    let user_id = store.add_user("u1", "Lina", Some("0591111111")).id;

    let dispatcher = IntentDispatcher::new(ChatServices::from_store(store.clone()));
    Harness {
        store,
        dispatcher,
        user_id,
        pizza,
        tea,
        chicken,
        beef,
    }
}

impl Harness {
    fn meta(&self) -> TurnMeta {
        TurnMeta::new("conv-1", Some("u1"))
    }

    async fn turn(&self, payload: IntentPayload) -> TurnReply {
        self.turn_at(payload, NOW).await
    }

    async fn turn_at(&self, payload: IntentPayload, now: i64) -> TurnReply {
        self.dispatcher
            .handle_turn_at(self.meta(), payload, now)
            .await
            .unwrap()
    }

    async fn draft(&self) -> Option<Order> {
        self.store.find_draft(self.user_id).await.unwrap()
    }

    async fn draft_items(&self) -> Vec<OrderItem> {
        match self.draft().await {
            Some(draft) => self.store.list_items(draft.id).await.unwrap(),
            None => Vec::new(),
        }
    }
}

fn item(name: &str, quantity: i32) -> RequestedItem {
    RequestedItem::named(name, quantity)
}

fn add(items: Vec<RequestedItem>) -> IntentPayload {
    IntentPayload {
        items,
        ..IntentPayload::keyword("add")
    }
}

fn targeted(keyword: &str, target: &str) -> IntentPayload {
    IntentPayload {
        target_item_name: Some(target.to_string()),
        ..IntentPayload::keyword(keyword)
    }
}

fn submit(address: &str) -> IntentPayload {
    IntentPayload {
        delivery_address: Some(address.to_string()),
        ..IntentPayload::keyword("submit")
    }
}

fn reserve(name: Option<&str>, date: &str, time: &str, party_size: i32) -> IntentPayload {
    IntentPayload {
        reservation: Some(ReservationRequest {
            customer_name: name.map(str::to_string),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            party_size: Some(party_size),
        }),
        ..IntentPayload::keyword("reserve")
    }
}

fn menu_filter(include: &[&str], exclude: &[&str]) -> IntentPayload {
    IntentPayload {
        ingredient_filter: Some(IngredientFilter {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        }),
        ..IntentPayload::keyword("filtered_menu")
    }
}
