//! Timer-driven match flow across several clients sharing one store.

mod common;

use std::sync::Arc;

use common::*;
use trumps_engine::cards::{CardId, DealError};
use trumps_engine::core::{EngineConfig, EngineError, GamePhase, Seat};
use trumps_engine::orchestrator::{IgnoreReason, RoomClient, Transition};
use trumps_engine::store::MemoryStore;

const ROOM: &str = "room-1";

async fn client(store: &Arc<MemoryStore>, local: &str, config: EngineConfig) -> RoomClient<MemoryStore> {
    RoomClient::connect(ROOM, local, Arc::clone(store), library(), config)
        .await
        .unwrap()
}

fn seeded(seed: u64) -> EngineConfig {
    EngineConfig::default().with_seed(seed)
}

#[tokio::test(start_paused = true)]
async fn test_three_humans_play_a_round() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    seed_match(&store, ROOM, &three_player_match(GamePhase::Spinning)).await;

    let alice = client(&store, "alice", seeded(1)).await;
    let bob = client(&store, "bob", seeded(2)).await;
    let carol = client(&store, "carol", seeded(3)).await;

    let mut rx = alice.snapshots();
    wait_for(&mut rx, "selecting", |s| s.game_phase == GamePhase::Selecting).await;

    assert_eq!(alice.submit_card(&"c5".into()).await.unwrap(), Transition::Applied);
    assert_eq!(bob.submit_card(&"c3".into()).await.unwrap(), Transition::Applied);
    assert_eq!(carol.submit_card(&"c7".into()).await.unwrap(), Transition::Applied);
    assert_eq!(alice.submit_attribute(&"Pop".into()).await.unwrap(), Transition::Applied);

    let resolved = wait_for(&mut rx, "round winner", |s| s.game_phase == GamePhase::AnimatingWin).await;
    assert_eq!(resolved.round_winner, Some(p("carol")));

    let next = wait_for(&mut rx, "round 2", |s| s.current_round == 2).await;
    assert_eq!(next.game_phase, GamePhase::Selecting);
    assert_eq!(next.current_player, p("carol"));
    assert_eq!(next.card_count(&p("carol")), 5);
    assert_eq!(next.card_count(&p("alice")), 2);
    assert_eq!(next.card_count(&p("bob")), 2);
    assert_eq!(next.round_history.len(), 1);
    assert_eq!(next.round_history[0].winner, Some(p("carol")));
}

#[tokio::test(start_paused = true)]
async fn test_host_advances_when_auto_advance_is_off() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    seed_match(&store, ROOM, &three_player_match(GamePhase::Selecting)).await;

    let config = seeded(5).with_auto_advance(false);
    let alice = client(&store, "alice", config.clone()).await;
    let bob = client(&store, "bob", config).await;

    let orchestrator = alice.orchestrator();
    orchestrator.submit_card(&p("alice"), &"c5".into()).await.unwrap();
    orchestrator.submit_card(&p("bob"), &"c3".into()).await.unwrap();
    orchestrator.submit_card(&p("carol"), &"c7".into()).await.unwrap();
    orchestrator.submit_attribute(&p("alice"), &"Crime".into()).await.unwrap();

    let mut rx = bob.snapshots();
    let resolved = wait_for(&mut rx, "round winner", |s| s.game_phase == GamePhase::AnimatingWin).await;
    // Crime is lower-wins: bob's c3 beats c5 and c7.
    assert_eq!(resolved.round_winner, Some(p("bob")));

    // Nothing moves on its own.
    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    assert_eq!(bob.latest().unwrap().game_phase, GamePhase::AnimatingWin);

    assert_eq!(
        bob.advance_next_round().await.unwrap(),
        Transition::Ignored(IgnoreReason::NotHost)
    );
    assert_eq!(alice.advance_next_round().await.unwrap(), Transition::Applied);

    let next = wait_for(&mut rx, "round 2", |s| s.current_round == 2).await;
    assert_eq!(next.current_player, p("bob"));
    assert_eq!(next.card_count(&p("bob")), 5);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_duplicate_submissions() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    seed_match(&store, ROOM, &three_player_match(GamePhase::Selecting)).await;

    let first = client(&store, "bob", seeded(1)).await;
    let second = client(&store, "bob", seeded(2)).await;

    let (c3, c4) = (CardId::new("c3"), CardId::new("c4"));
    let (a, b) = tokio::join!(first.submit_card(&c3), second.submit_card(&c4));
    let outcomes = [a.unwrap(), b.unwrap()];
    assert_eq!(outcomes.iter().filter(|t| t.is_applied()).count(), 1);

    let state = first.orchestrator().snapshot().await.unwrap().unwrap();
    assert_eq!(state.current_round_plays.len(), 1);
    assert!(state.has_played(&p("bob")));
}

#[tokio::test(start_paused = true)]
async fn test_return_to_lobby_then_rematch() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    let alice = client(&store, "alice", seeded(9)).await;
    let bob = client(&store, "bob", seeded(10)).await;

    let seats = three_player_match(GamePhase::Spinning).players;
    assert_eq!(alice.start_match(seats.clone(), "cities").await.unwrap(), Transition::Applied);

    let mut rx = bob.snapshots();
    let first = wait_for(&mut rx, "first match selecting", |s| s.game_phase == GamePhase::Selecting).await;
    assert_eq!(first.total_cards(), 9);

    assert_eq!(
        bob.return_to_lobby().await.unwrap(),
        Transition::Ignored(IgnoreReason::NotHost)
    );
    assert_eq!(alice.return_to_lobby().await.unwrap(), Transition::Applied);
    wait_for_lobby(&mut rx).await;
    wait_for_lobby(&mut alice.snapshots()).await;
    assert!(alice.orchestrator().snapshot().await.unwrap().is_none());

    // Same room, round 1 again: the timers must run for the new match.
    assert_eq!(alice.start_match(seats, "cities").await.unwrap(), Transition::Applied);
    let second = wait_for(&mut rx, "second match selecting", |s| {
        s.match_id != first.match_id && s.game_phase == GamePhase::Selecting
    })
    .await;
    assert_eq!(second.current_round, 1);
    assert!(second.round_history.is_empty());

    let lead = second.current_player.clone();
    let card = second.hand(&lead).unwrap()[0].clone();
    assert_eq!(
        alice.orchestrator().submit_card(&lead, &card).await.unwrap(),
        Transition::Applied
    );
}

#[tokio::test(start_paused = true)]
async fn test_timer_step_retried_after_store_failure() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    seed_match(&store, ROOM, &three_player_match(GamePhase::Spinning)).await;

    // A single client: nobody else would notice the stuck spin.
    store.fail_next_writes(1);
    let alice = client(&store, "alice", seeded(4)).await;
    let mut rx = alice.snapshots();

    let selecting = wait_for(&mut rx, "selecting", |s| s.game_phase == GamePhase::Selecting).await;
    assert_eq!(selecting.current_round, 1);
    // The seed and the retried spin; the rejected attempt applied nothing.
    assert_eq!(store.write_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_deck_smaller_than_seats_is_rejected() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    let alice = client(&store, "alice", seeded(6)).await;

    let mut seats = vec![Seat::human("alice").host()];
    seats.extend((1..7).map(|i| Seat::human(format!("guest{i}"))));
    let err = alice.start_match(seats, "animals").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Deal(DealError::NotEnoughCards { cards: 6, players: 7 })
    ));
    assert!(!err.is_retryable());

    assert!(alice.orchestrator().snapshot().await.unwrap().is_none());
    assert_eq!(store.write_count(), 0);
}
