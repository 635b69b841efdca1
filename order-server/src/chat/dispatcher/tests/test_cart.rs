use super::*;

#[tokio::test]
async fn test_repeated_add_merges_into_one_line() {
    let h = harness();

    h.turn(add(vec![item("Pizza", 2)])).await;
    let reply = h.turn(add(vec![item("pizza", 1)])).await;

    assert!(reply.success);
    assert_eq!(reply.cart.len(), 1);
    assert_eq!(reply.cart[0].menu_item_id, h.pizza);
    assert_eq!(reply.cart[0].quantity, 3);
    assert_eq!(reply.subtotal, 30.0);

    let items = h.draft_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
}

#[tokio::test]
async fn test_add_by_id_and_notes() {
    let h = harness();
    let by_id = RequestedItem {
        menu_item_id: Some(h.pizza),
        quantity: Some(1),
        extras: vec!["Extra Cheese".into()],
        ..Default::default()
    };
    h.turn(add(vec![by_id.clone()])).await;
    h.turn(add(vec![item("Pizza", 1)])).await;
    let reply = h
        .turn(add(vec![RequestedItem {
            extras: vec!["  extra cheese ".into()],
            ..by_id
        }]))
        .await;

    assert_eq!(reply.cart.len(), 2);
    assert_eq!(reply.cart[0].notes, "extra cheese");
    assert_eq!(reply.cart[0].quantity, 2);
    assert_eq!(reply.cart[1].notes, "");
    assert_eq!(h.draft_items().await.len(), 2);
}

#[tokio::test]
async fn test_partial_add_reports_only_missing_items() {
    let h = harness();
    let reply = h
        .turn(add(vec![item("Pizza", 1), item("Sushi", 2), item("Tea", 1)]))
        .await;

    assert!(reply.success);
    assert_eq!(reply.cart.len(), 2);
    assert_eq!(reply.diagnostics, vec!["Item not found: Sushi".to_string()]);
    assert!(reply.reply.contains("Sushi"));
}

#[tokio::test]
async fn test_add_nothing_resolvable_leaves_cart_untouched() {
    let h = harness();
    h.store.set_available(h.tea, false);

    let reply = h.turn(add(vec![item("Sushi", 1), item("Tea", 1)])).await;

    assert!(!reply.success);
    assert_eq!(reply.error_code, Some(ErrorCode::ItemNotFound));
    assert!(reply.cart.is_empty());
    assert!(h.draft().await.is_none());
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_add_past_quantity_limit_keeps_cart() {
    let h = harness();
    let reply = h.turn(add(vec![item("Pizza", 99)])).await;
    assert!(reply.success);

    let reply = h.turn(add(vec![item("Tea", 1), item("Pizza", 1)])).await;

    assert!(!reply.success);
    assert_eq!(reply.error_code, Some(ErrorCode::ValueOutOfRange));
    assert!(reply.reply.contains("at most 99 x Pizza"));
    assert_eq!(reply.cart.len(), 1);
    assert_eq!(reply.cart[0].quantity, 99);
    let items = h.draft_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 99);

    let reply = h.turn(add(vec![item("Pizza", i32::MAX)])).await;
    assert!(!reply.success);
    assert_eq!(reply.error_code, Some(ErrorCode::MalformedIntent));
    assert_eq!(reply.cart[0].quantity, 99);
}

#[tokio::test]
async fn test_remove_substring_hits_every_kebab() {
    let h = harness();
    h.turn(add(vec![
        item("Chicken Kebab", 1),
        item("Pizza", 1),
        item("Beef Kebab", 2),
    ]))
    .await;

    let reply = h.turn(targeted("remove", "Kebab")).await;

    assert!(reply.success);
    assert_eq!(reply.cart.len(), 1);
    assert_eq!(reply.cart[0].menu_item_id, h.pizza);
    let items = h.draft_items().await;
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|i| i.menu_item_id != h.chicken && i.menu_item_id != h.beef));
}

#[tokio::test]
async fn test_remove_unknown_target() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 1)])).await;

    let reply = h.turn(targeted("remove", "Soup")).await;

    assert!(!reply.success);
    assert_eq!(reply.error_code, Some(ErrorCode::ItemNotFound));
    assert_eq!(reply.cart.len(), 1);
}

#[tokio::test]
async fn test_removing_last_line_deletes_draft() {
    let h = harness();
    h.turn(add(vec![item("Tea", 1)])).await;
    assert!(h.draft().await.is_some());

    let reply = h.turn(targeted("remove", "tea")).await;

    assert!(reply.success);
    assert!(reply.cart.is_empty());
    assert!(h.draft().await.is_none());
}

#[tokio::test]
async fn test_replace_keeps_quantity_and_position() {
    let h = harness();
    h.turn(add(vec![item("Tea", 2), item("Falafel Wrap", 1)])).await;

    let reply = h
        .turn(IntentPayload {
            replacement_item: Some(RequestedItem {
                name: Some("Pizza".into()),
                ..Default::default()
            }),
            ..targeted("replace", "tea")
        })
        .await;

    assert!(reply.success);
    assert_eq!(reply.cart[0].menu_item_id, h.pizza);
    assert_eq!(reply.cart[0].quantity, 2);
    assert_eq!(reply.cart[1].name, "Falafel Wrap");
    assert_eq!(reply.subtotal, 28.0);
}

#[tokio::test]
async fn test_replace_merges_into_identical_line() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 1), item("Tea", 2)])).await;

    let reply = h
        .turn(IntentPayload {
            replacement_item: Some(item("Pizza", 2)),
            ..targeted("replace", "Tea")
        })
        .await;

    assert_eq!(reply.cart.len(), 1);
    assert_eq!(reply.cart[0].quantity, 3);
    assert_eq!(h.draft_items().await.len(), 1);
}

#[tokio::test]
async fn test_replace_failures() {
    let h = harness();
    h.turn(add(vec![item("Tea", 1)])).await;
    h.store.set_available(h.beef, false);

    let reply = h
        .turn(IntentPayload {
            replacement_item: Some(item("Beef Kebab", 1)),
            ..targeted("replace", "Tea")
        })
        .await;
    assert_eq!(reply.error_code, Some(ErrorCode::ReplacementUnavailable));
    assert_eq!(reply.cart[0].menu_item_id, h.tea);

    let reply = h
        .turn(IntentPayload {
            replacement_item: Some(item("Pizza", 1)),
            ..targeted("replace", "Coffee")
        })
        .await;
    assert_eq!(reply.error_code, Some(ErrorCode::ItemNotFound));
}

#[tokio::test]
async fn test_update_quantity_and_zero_removes() {
    let h = harness();
    h.turn(add(vec![item("Tea", 1), item("Pizza", 1)])).await;

    let reply = h
        .turn(IntentPayload {
            new_quantity: Some(4),
            ..targeted("update_quantity", "tea")
        })
        .await;
    assert_eq!(reply.cart[0].quantity, 4);
    assert_eq!(reply.subtotal, 30.0);

    let reply = h
        .turn(IntentPayload {
            new_quantity: Some(0),
            ..targeted("update-quantity", "Tea")
        })
        .await;
    assert!(reply.success);
    assert_eq!(reply.cart.len(), 1);
    assert_eq!(reply.cart[0].menu_item_id, h.pizza);
}

#[tokio::test]
async fn test_anonymous_cart_stays_in_memory() {
    let h = harness();
    let meta = TurnMeta::new("conv-anon", None);

    let reply = h
        .dispatcher
        .handle_turn_at(meta, add(vec![item("Pizza", 2)]), NOW)
        .await
        .unwrap();

    assert!(reply.success);
    assert_eq!(reply.cart[0].quantity, 2);
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_malformed_payloads_are_replies() {
    let h = harness();

    let reply = h.turn(IntentPayload::default()).await;
    assert!(!reply.success);
    assert_eq!(reply.intent, None);
    assert_eq!(reply.error_code, Some(ErrorCode::MalformedIntent));

    let reply = h.turn(IntentPayload::keyword("dance")).await;
    assert_eq!(reply.error_code, Some(ErrorCode::MalformedIntent));

    let reply = h.turn(IntentPayload::keyword("remove")).await;
    assert_eq!(reply.error_code, Some(ErrorCode::MalformedIntent));
}

#[tokio::test]
async fn test_session_end_then_start_restores_cart() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 2), item("Tea", 1)])).await;

    let report = h.dispatcher.end_session(h.meta()).await.unwrap();
    assert!(report.is_noop());
    assert!(h.dispatcher.services().sessions.is_empty());
    assert_eq!(h.draft_items().await.len(), 2);

    let snapshot = h.dispatcher.start_session(h.meta()).await.unwrap();
    assert_eq!(snapshot.lines_loaded, 2);
    assert_eq!(snapshot.subtotal, 25.0);

    // New conversation id, same user: the draft follows the user
    let other = h
        .dispatcher
        .start_session(TurnMeta::new("conv-2", Some("u1")))
        .await
        .unwrap();
    assert_eq!(other.lines_loaded, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_turns_on_one_session_serialize() {
    let h = Arc::new(harness());

    let mut handles = Vec::new();
    for _ in 0..10 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            h.turn(add(vec![item("Pizza", 1)])).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().success);
    }

    let cart = h
        .dispatcher
        .services()
        .sessions
        .get(&SessionKey::new("conv-1", Some("u1")));
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 10);
    assert_eq!(h.draft_items().await[0].quantity, 10);
}
