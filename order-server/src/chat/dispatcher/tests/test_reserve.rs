use super::*;
use shared::models::Reservation;

#[tokio::test]
async fn test_reserve_on_closed_day_touches_nothing() {
    let h = harness();
    h.turn(add(vec![item("Pizza", 1)])).await;
    let writes = h.store.write_count();

    // 2030-03-15 is a Friday
    let reply = h.turn(reserve(Some("Lina"), "2030-03-15", "19:00", 4)).await;

    assert!(!reply.success);
    assert_eq!(reply.intent, Some(IntentKind::Reserve));
    assert_eq!(reply.error_code, Some(ErrorCode::RestaurantClosed));
    assert!(reply.reply.contains("Fri"));
    assert_eq!(h.store.reservation_count(), 0);
    assert_eq!(reply.cart.len(), 1);
    assert_eq!(h.store.write_count(), writes);
}

#[tokio::test]
async fn test_reserve_falls_back_to_profile_name() {
    let h = harness();

    let reply = h.turn(reserve(None, "2030-03-16", "19:30:00", 4)).await;

    assert!(reply.success, "{}", reply.reply);
    let reservation: Reservation = serde_json::from_value(reply.data.unwrap()).unwrap();
    assert_eq!(reservation.customer_name, "Lina");
    assert_eq!(reservation.user_id, h.user_id);
    assert_eq!(reservation.party_size, 4);
    assert!(reply.reply.contains("6 table(s) left"));
}

#[tokio::test]
async fn test_reserve_today_is_allowed() {
    let h = harness();
    let reply = h.turn(reserve(Some("Lina"), "2030-03-14", "20:00", 2)).await;
    assert!(reply.success, "{}", reply.reply);
}

#[tokio::test]
async fn test_reserve_validation_errors() {
    let h = harness();

    let reply = h.turn(reserve(Some("Lina"), "2030-03-13", "19:00", 2)).await;
    assert_eq!(reply.error_code, Some(ErrorCode::ReservationDateInPast));

    let reply = h.turn(reserve(Some("Lina"), "2030-03-16", "19:00", 11)).await;
    assert_eq!(reply.error_code, Some(ErrorCode::InvalidPartySize));

    let reply = h.turn(reserve(Some("Lina"), "2030-03-16", "19:00", 0)).await;
    assert_eq!(reply.error_code, Some(ErrorCode::InvalidPartySize));

    let reply = h.turn(reserve(Some("Lina"), "16/03/2030", "19:00", 2)).await;
    assert_eq!(reply.error_code, Some(ErrorCode::MalformedIntent));

    assert_eq!(h.store.reservation_count(), 0);
}

#[tokio::test]
async fn test_slot_capacity_and_duplicates() {
    let h = harness();
    for n in 0..7 {
        let name = format!("Guest {n}");
        let reply = h
            .turn(reserve(Some(&name), "2030-03-18", "13:00", 2))
            .await;
        assert!(reply.success, "{}", reply.reply);
    }

    let reply = h.turn(reserve(Some("Late"), "2030-03-18", "13:00", 2)).await;
    assert_eq!(reply.error_code, Some(ErrorCode::SlotFull));

    let reply = h.turn(reserve(Some("guest 3"), "2030-03-18", "14:00", 2)).await;
    assert!(reply.success);
    let reply = h.turn(reserve(Some("GUEST 3"), "2030-03-18", "14:00", 5)).await;
    assert_eq!(reply.error_code, Some(ErrorCode::DuplicateReservation));

    assert_eq!(h.store.reservation_count(), 8);
}

#[tokio::test]
async fn test_reserve_requires_known_user() {
    let h = harness();
    let reply = h
        .dispatcher
        .handle_turn_at(
            TurnMeta::new("conv-anon", None),
            reserve(Some("Sam"), "2030-03-16", "19:00", 2),
            NOW,
        )
        .await
        .unwrap();

    assert_eq!(reply.error_code, Some(ErrorCode::UserNotFound));
    assert_eq!(h.store.reservation_count(), 0);
}
