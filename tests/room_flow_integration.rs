//! End-to-end room flow tests through the registry and room handles.
//!
//! Timer behavior (action timeouts, payout auto-advance) runs under
//! `start_paused` so the tests drive virtual time instead of sleeping.

use holdem_rooms::{
    Action, DisplayName, JoinOutcome, RoomConfig, RoomError, RoomEvent, RoomRegistry,
    ValidationError,
};
use std::time::Duration;
use uuid::Uuid;

fn name(s: &str) -> DisplayName {
    let _ = env_logger::builder().is_test(true).try_init();
    DisplayName::from(s)
}

#[tokio::test]
async fn test_create_join_start_and_fold_out() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();

    let room = registry
        .create_room(RoomConfig::default(), host, name("alice"))
        .await
        .unwrap();
    let outcome = room.join(guest, name("bob")).await.unwrap();
    assert_eq!(outcome, JoinOutcome::Seated(1));

    let snapshot = room.start_hand(host).await.unwrap();
    assert_eq!(snapshot.phase, "betting");
    assert_eq!(snapshot.players.len(), 2);
    assert_eq!(snapshot.pot_total, 15);
    // The starter sees only their own hole cards.
    assert!(snapshot.players[0].hole_cards.is_some());
    assert!(snapshot.players[1].hole_cards.is_none());

    // Heads-up: the dealer (seat 1) acts first and folds.
    let acting = snapshot.acting_seat.unwrap();
    let actor_id = snapshot.players[acting].id;
    let settled = room.take_action(actor_id, Action::Fold).await.unwrap();
    assert_eq!(settled.phase, "payout");
    let stacks: Vec<u32> = settled.players.iter().map(|p| p.stack).collect();
    assert_eq!(stacks.iter().sum::<u32>(), 2000);
}

#[tokio::test]
async fn test_start_hand_rejected_for_non_host() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();
    let room = registry
        .create_room(RoomConfig::default(), host, name("alice"))
        .await
        .unwrap();
    room.join(guest, name("bob")).await.unwrap();

    let err = room.start_hand(guest).await.unwrap_err();
    assert_eq!(err, RoomError::Validation(ValidationError::NotHost));
}

#[tokio::test]
async fn test_out_of_turn_action_rejected() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();
    let room = registry
        .create_room(RoomConfig::default(), host, name("alice"))
        .await
        .unwrap();
    room.join(guest, name("bob")).await.unwrap();

    let snapshot = room.start_hand(host).await.unwrap();
    let acting = snapshot.acting_seat.unwrap();
    let bystander = snapshot
        .players
        .iter()
        .find(|p| p.seat != acting)
        .unwrap()
        .id;
    let err = room.take_action(bystander, Action::Call).await.unwrap_err();
    assert_eq!(err, RoomError::Validation(ValidationError::NotYourTurn));
}

#[tokio::test]
async fn test_snapshot_masks_hole_cards_per_observer() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();
    let room = registry
        .create_room(RoomConfig::default(), host, name("alice"))
        .await
        .unwrap();
    room.join(guest, name("bob")).await.unwrap();
    room.start_hand(host).await.unwrap();

    let as_guest = room.snapshot(Some(guest)).await.unwrap();
    assert!(as_guest.players[1].hole_cards.is_some());
    assert!(as_guest.players[0].hole_cards.is_none());

    let as_spectator = room.snapshot(None).await.unwrap();
    assert!(as_spectator.players.iter().all(|p| p.hole_cards.is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_action_timeout_applies_auto_action() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();
    let room = registry
        .create_room(RoomConfig::default(), host, name("alice"))
        .await
        .unwrap();
    room.join(guest, name("bob")).await.unwrap();
    let mut events = room.subscribe(host, 32).await.unwrap();
    room.start_hand(host).await.unwrap();

    // Nobody acts. The small blind owes chips, so the timeout folds them
    // and the hand settles; virtual time jumps straight to the deadline.
    let settled = tokio::time::timeout(Duration::from_secs(120), async {
        loop {
            match events.recv().await {
                Some(RoomEvent::HandSettled { payouts, .. }) => break payouts,
                Some(_) => {}
                None => panic!("event stream ended before settlement"),
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(settled.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_payout_auto_advances_to_next_hand() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();
    let room = registry
        .create_room(RoomConfig::default(), host, name("alice"))
        .await
        .unwrap();
    room.join(guest, name("bob")).await.unwrap();
    let mut events = room.subscribe(host, 32).await.unwrap();

    let snapshot = room.start_hand(host).await.unwrap();
    let acting = snapshot.players[snapshot.acting_seat.unwrap()].id;
    room.take_action(acting, Action::Fold).await.unwrap();

    // After the auto-advance delay the next hand deals itself.
    let next = tokio::time::timeout(Duration::from_secs(120), async {
        loop {
            match events.recv().await {
                Some(RoomEvent::HandStarted { snapshot }) if snapshot.hand_no == 2 => {
                    break snapshot;
                }
                Some(_) => {}
                None => panic!("event stream ended before the next hand"),
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(next.phase, "betting");
    // Blinds moved with the button.
    assert_eq!(next.pot_total, 15);
}

#[tokio::test]
async fn test_room_closes_when_everyone_leaves() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();
    let room = registry
        .create_room(RoomConfig::default(), host, name("alice"))
        .await
        .unwrap();
    room.join(guest, name("bob")).await.unwrap();
    let mut events = room.subscribe(guest, 8).await.unwrap();

    room.leave(host).await.unwrap();
    room.leave(guest).await.unwrap();

    // The actor stops once empty and tells the remaining subscribers.
    let mut saw_closed = false;
    while let Some(event) = events.recv().await {
        if matches!(event, RoomEvent::RoomClosed) {
            saw_closed = true;
        }
    }
    assert!(saw_closed);
    // Let the actor task finish dropping its inbox.
    for _ in 0..64 {
        if room.is_closed() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(registry.get(room.room_id()).await.is_none());
}

#[tokio::test]
async fn test_registry_lookup_and_close() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let room = registry
        .create_room(RoomConfig::default(), host, name("alice"))
        .await
        .unwrap();
    let id = room.room_id();

    assert!(registry.get(id).await.is_some());
    assert_eq!(registry.list_rooms().await, vec![id]);

    registry.close_room(id).await;
    assert!(registry.get(id).await.is_none());
    assert_eq!(registry.room_count().await, 0);

    // Requests through a stale handle fail cleanly.
    let err = room.join(Uuid::new_v4(), name("late")).await.unwrap_err();
    assert_eq!(err, ValidationError::RoomClosed);
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let registry = RoomRegistry::new();
    let mut config = RoomConfig::default();
    config.settings.big_blind = config.settings.small_blind;
    let err = registry
        .create_room(config, Uuid::new_v4(), name("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidAction(_)));
}

#[tokio::test]
async fn test_full_table_rejects_extra_join() {
    let registry = RoomRegistry::new();
    let host = Uuid::new_v4();
    let mut config = RoomConfig::default();
    config.settings.max_seats = 2;
    let room = registry
        .create_room(config, host, name("alice"))
        .await
        .unwrap();
    room.join(Uuid::new_v4(), name("bob")).await.unwrap();
    let err = room.join(Uuid::new_v4(), name("carol")).await.unwrap_err();
    assert_eq!(err, ValidationError::RoomFull);
}
