use super::*;
use crate::chat::actions::CancelReport;
use shared::models::{DeliveryDetails, NewOrderItem};

async fn pending_order(h: &Harness, created_at: i64) -> Order {
    let delivery = DeliveryDetails {
        address: "Ramallah".into(),
        customer_name: "Lina".into(),
        phone_number: None,
    };
    let items = [NewOrderItem {
        menu_item_id: h.pizza,
        quantity: 1,
        notes: String::new(),
    }];
    h.store
        .create_order(h.user_id, &delivery, &items, created_at)
        .await
        .unwrap()
}

fn report(reply: TurnReply) -> CancelReport {
    serde_json::from_value(reply.data.unwrap()).unwrap()
}

#[tokio::test]
async fn test_cancel_draft_and_recent_pending_only() {
    let h = harness();
    let old = pending_order(&h, NOW - 5 * MINUTE).await;
    let recent = pending_order(&h, NOW - MINUTE).await;
    h.turn(add(vec![item("Pizza", 1), item("Tea", 2)])).await;
    let draft_id = h.draft().await.unwrap().id;

    let reply = h.turn(IntentPayload::keyword("cancel")).await;

    assert!(reply.success);
    assert!(reply.cart.is_empty());
    let report = report(reply);
    assert_eq!(report.draft_cancelled, Some(draft_id));
    assert_eq!(report.pending_cancelled, Some(recent.id));
    assert_eq!(report.outside_window, vec![old.id]);
    assert!(report.superseded.is_empty());

    assert_eq!(h.store.order(draft_id).unwrap().status, OrderStatus::Cancelled);
    assert_eq!(h.store.order(recent.id).unwrap().status, OrderStatus::Cancelled);
    assert_eq!(h.store.order(old.id).unwrap().status, OrderStatus::Pending);
    assert!(h.draft().await.is_none());
}

#[tokio::test]
async fn test_cancel_only_newest_pending_in_window() {
    let h = harness();
    let first = pending_order(&h, NOW - 2 * MINUTE).await;
    let second = pending_order(&h, NOW - MINUTE).await;

    let reply = h.turn(IntentPayload::keyword("cancel")).await;

    assert_eq!(
        reply.reply,
        format!(
            "Your submitted order #{} has been cancelled. Order #{} was kept: only your most recent order can be cancelled.",
            second.id, first.id
        )
    );
    let report = report(reply);
    assert_eq!(report.draft_cancelled, None);
    assert_eq!(report.pending_cancelled, Some(second.id));
    assert_eq!(report.superseded, vec![first.id]);
    assert!(report.outside_window.is_empty());
}

#[tokio::test]
async fn test_cancel_reports_older_orders_by_reason() {
    let h = harness();
    let stale = pending_order(&h, NOW - 10 * MINUTE).await;
    let earlier = pending_order(&h, NOW - 2 * MINUTE).await;
    let latest = pending_order(&h, NOW - MINUTE).await;

    let reply = h.turn(IntentPayload::keyword("cancel")).await;

    assert!(reply.reply.contains(&format!("#{} was kept", earlier.id)));
    assert!(reply.reply.contains(&format!(
        "Order #{} can no longer be cancelled because it was placed more than 3 minutes ago.",
        stale.id
    )));
    assert!(!reply.reply.contains(&format!("#{} can no longer", earlier.id)));
    let report = report(reply);
    assert_eq!(report.pending_cancelled, Some(latest.id));
    assert_eq!(report.superseded, vec![earlier.id]);
    assert_eq!(report.outside_window, vec![stale.id]);
}

#[tokio::test]
async fn test_cancel_window_counts_from_submission() {
    let h = harness();
    // Draft opened long before it was submitted
    h.turn_at(add(vec![item("Pizza", 1)]), NOW - 30 * MINUTE).await;
    h.turn(submit("Ramallah")).await;

    let reply = h
        .turn_at(IntentPayload::keyword("cancel"), NOW + 2 * MINUTE)
        .await;
    let report = report(reply);
    assert!(report.pending_cancelled.is_some());
    assert!(report.outside_window.is_empty());
    assert!(report.superseded.is_empty());
}

#[tokio::test]
async fn test_cancel_after_window_is_reported() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 1)])).await;
    h.turn(submit("Ramallah")).await;

    let reply = h
        .turn_at(IntentPayload::keyword("cancel"), NOW + 3 * MINUTE + 1)
        .await;

    assert!(reply.reply.contains("can no longer be cancelled"));
    let report = report(reply);
    assert_eq!(report.pending_cancelled, None);
    assert_eq!(report.outside_window.len(), 1);
    assert!(report.superseded.is_empty());
}

#[tokio::test]
async fn test_cancel_with_nothing_to_cancel() {
    let h = harness();

    let reply = h.turn(IntentPayload::keyword("cancel")).await;

    assert!(reply.success);
    assert!(reply.reply.contains("nothing to cancel"));
    assert_eq!(report(reply), CancelReport::default());
}

#[tokio::test]
async fn test_anonymous_cancel_clears_cart() {
    let h = harness();
    let meta = TurnMeta::new("conv-anon", None);
    h.dispatcher
        .handle_turn_at(meta.clone(), add(vec![item("Tea", 1)]), NOW)
        .await
        .unwrap();

    let reply = h
        .dispatcher
        .handle_turn_at(meta, IntentPayload::keyword("cancel"), NOW)
        .await
        .unwrap();

    assert!(reply.success);
    assert!(reply.cart.is_empty());
    assert_eq!(reply.data, None);
}
