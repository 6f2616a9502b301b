//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use im::OrdMap;
use once_cell::sync::OnceCell;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use trumps_engine::cards::{AttributeSpec, Card, CardId, Deck, DeckLibrary};
use trumps_engine::core::{GamePhase, Hand, MatchState, PlayerId, Seat};
use trumps_engine::store::{match_path, MemoryStore, SharedStore};

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install test logging once per process.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, then defaults to `warn`.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

/// Nine cities; card `cN` has Pop `N * 100` and Crime `N`.
pub fn cities() -> Deck {
    Deck::builder("cities", "Cities")
        .attribute(AttributeSpec::higher("Pop"))
        .attribute(AttributeSpec::lower("Crime"))
        .cards((1..=9).map(|i| {
            Card::new(format!("c{i}"), format!("City {i}"))
                .with_attr("Pop", f64::from(i * 100))
                .with_attr("Crime", f64::from(i))
        }))
        .build()
        .unwrap()
}

/// Six animals with one lower-wins attribute.
pub fn animals() -> Deck {
    Deck::builder("animals", "Animals")
        .attribute(AttributeSpec::higher("speed"))
        .attribute(AttributeSpec::higher("weight"))
        .attribute(AttributeSpec::lower("lifespan"))
        .card(Card::new("cheetah", "Cheetah").with_attr("speed", 110.0).with_attr("weight", 50.0).with_attr("lifespan", 12.0))
        .card(Card::new("elephant", "Elephant").with_attr("speed", 40.0).with_attr("weight", 6000.0).with_attr("lifespan", 70.0))
        .card(Card::new("mouse", "Mouse").with_attr("speed", 13.0).with_attr("weight", 0.02).with_attr("lifespan", 2.0))
        .card(Card::new("horse", "Horse").with_attr("speed", 88.0).with_attr("weight", 500.0).with_attr("lifespan", 30.0))
        .card(Card::new("tortoise", "Tortoise").with_attr("speed", 0.3).with_attr("weight", 250.0).with_attr("lifespan", 150.0))
        .card(Card::new("wolf", "Wolf").with_attr("speed", 60.0).with_attr("weight", 45.0).with_attr("lifespan", 14.0))
        .build()
        .unwrap()
}

pub fn library() -> Arc<DeckLibrary> {
    let mut library = DeckLibrary::new();
    library.register(cities()).unwrap();
    library.register(animals()).unwrap();
    Arc::new(library)
}

pub fn p(name: &str) -> PlayerId {
    PlayerId::new(name)
}

pub fn hand(ids: &[&str]) -> Hand {
    ids.iter().map(|id| CardId::new(*id)).collect()
}

/// alice (host), bob and carol, three cities each, alice leading round 1.
pub fn three_player_match(phase: GamePhase) -> MatchState {
    let seats = vec![Seat::human("alice").host(), Seat::human("bob"), Seat::human("carol")];
    let mut hands = OrdMap::new();
    hands.insert(p("alice"), hand(&["c5", "c1", "c2"]));
    hands.insert(p("bob"), hand(&["c3", "c4", "c6"]));
    hands.insert(p("carol"), hand(&["c7", "c8", "c9"]));
    let mut state = MatchState::new("cities", seats, hands, p("alice"));
    state.game_phase = phase;
    state
}

/// Write `state` as the room's match record.
pub async fn seed_match(store: &MemoryStore, room: &str, state: &MatchState) {
    let record = serde_json::to_value(state).unwrap();
    store.write(BTreeMap::from([(match_path(room), record)])).await.unwrap();
}

/// Wait (in virtual time) for a snapshot matching `pred`.
pub async fn wait_for<F>(rx: &mut watch::Receiver<Option<MatchState>>, what: &str, pred: F) -> MatchState
where
    F: Fn(&MatchState) -> bool,
{
    let waited = tokio::time::timeout(
        Duration::from_secs(24 * 3600),
        rx.wait_for(|snapshot| snapshot.as_ref().is_some_and(&pred)),
    )
    .await;

    match waited {
        Ok(Ok(snapshot)) => snapshot.clone().unwrap(),
        Ok(Err(_)) => panic!("snapshot channel closed while waiting for {what}"),
        Err(_) => panic!("timed out waiting for {what}"),
    }
}

/// Wait for the room to have no match record.
pub async fn wait_for_lobby(rx: &mut watch::Receiver<Option<MatchState>>) {
    let waited = tokio::time::timeout(Duration::from_secs(3600), rx.wait_for(Option::is_none)).await;
    assert!(matches!(waited, Ok(Ok(_))), "room never returned to the lobby");
}
