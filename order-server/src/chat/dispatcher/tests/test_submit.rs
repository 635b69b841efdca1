use super::*;
use crate::chat::reconciler::SubmittedOrder;

#[tokio::test]
async fn test_submit_promotes_draft_with_zone_fee() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 2), item("Tea", 1)])).await;
    let draft_id = h.draft().await.unwrap().id;

    let reply = h.turn(submit("Birzeit University, main gate")).await;

    assert!(reply.success, "{}", reply.reply);
    assert_eq!(reply.intent, Some(IntentKind::Submit));
    let submitted: SubmittedOrder = serde_json::from_value(reply.data.unwrap()).unwrap();
    assert_eq!(submitted.order_id, draft_id);
    assert!(submitted.from_draft);
    assert_eq!(submitted.subtotal, 25.0);
    assert_eq!(submitted.delivery_fee, 7.0);
    assert_eq!(submitted.total, 32.0);

    assert!(reply.cart.is_empty());
    assert_eq!(reply.subtotal, 0.0);
    assert!(h.draft().await.is_none());

    let order = h.store.order(draft_id).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.delivery_address.as_deref(), Some("Birzeit University, main gate"));
    assert_eq!(order.customer_name.as_deref(), Some("Lina"));
    assert_eq!(order.phone_number.as_deref(), Some("0591111111"));
    assert_eq!(order.created_at, NOW);
}

#[tokio::test]
async fn test_submit_empty_cart_creates_nothing() {
    let h = harness();

    let reply = h.turn(submit("Ramallah")).await;

    assert!(!reply.success);
    assert_eq!(reply.error_code, Some(ErrorCode::OrderEmpty));
    assert!(h.store.orders_for(h.user_id).is_empty());
}

#[tokio::test]
async fn test_submit_outside_zones_keeps_draft() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 1)])).await;

    let reply = h.turn(submit("Haifa")).await;
    assert!(!reply.success);
    assert_eq!(reply.error_code, Some(ErrorCode::UnsupportedDeliveryZone));
    assert_eq!(reply.cart.len(), 1);
    assert_eq!(h.draft().await.unwrap().status, OrderStatus::Draft);

    let reply = h.turn(IntentPayload::keyword("submit")).await;
    assert_eq!(reply.error_code, Some(ErrorCode::UnsupportedDeliveryZone));
    assert_eq!(h.store.orders_for(h.user_id).len(), 1);
}

#[tokio::test]
async fn test_submit_prices_at_current_menu_price() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 2)])).await;
    h.store.set_price(h.pizza, 12.5);

    let reply = h.turn(submit("Al-Bireh")).await;

    let submitted: SubmittedOrder = serde_json::from_value(reply.data.unwrap()).unwrap();
    assert_eq!(submitted.subtotal, 25.0);
    assert_eq!(submitted.delivery_fee, 0.0);
    assert_eq!(submitted.total, 25.0);
}

#[tokio::test]
async fn test_submit_uses_given_contact_details() {
    let h = harness();
    h.turn(add(vec![item("Tea", 3)])).await;

    let reply = h
        .turn(IntentPayload {
            customer_name: Some("Omar".into()),
            phone_number: Some("0599999999".into()),
            ..submit("Nablus old city")
        })
        .await;

    let submitted: SubmittedOrder = serde_json::from_value(reply.data.unwrap()).unwrap();
    assert_eq!(submitted.total, 27.0);
    let order = h.store.order(submitted.order_id).unwrap();
    assert_eq!(order.customer_name.as_deref(), Some("Omar"));
    assert_eq!(order.phone_number.as_deref(), Some("0599999999"));
}

#[tokio::test]
async fn test_submit_requires_known_user() {
    let h = harness();
    let meta = TurnMeta::new("conv-ghost", Some("ghost"));
    h.dispatcher
        .handle_turn_at(meta.clone(), add(vec![item("Pizza", 1)]), NOW)
        .await
        .unwrap();

    let reply = h
        .dispatcher
        .handle_turn_at(meta, submit("Ramallah"), NOW)
        .await
        .unwrap();

    assert_eq!(reply.error_code, Some(ErrorCode::UserNotFound));
    assert_eq!(reply.cart.len(), 1);
}

#[tokio::test]
async fn test_cart_after_submit_starts_a_new_draft() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 1)])).await;
    h.turn(submit("Ramallah")).await;

    let reply = h.turn(add(vec![item("Tea", 1)])).await;

    assert_eq!(reply.cart.len(), 1);
    let items = h.draft_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].menu_item_id, h.tea);
    assert_eq!(h.store.orders_for(h.user_id).len(), 2);
}
