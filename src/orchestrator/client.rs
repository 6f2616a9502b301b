//! One client's connection to a room.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::machine::Orchestrator;
use super::Transition;
use crate::bots::BotEngine;
use crate::cards::{AttributeKey, CardId, DeckLibrary};
use crate::core::{EngineConfig, EngineError, MatchState, PlayerId, Seat};
use crate::store::{match_path, SharedStore, Subscription};

/// A local player's view of a room.
///
/// Subscribes to the room's match record and, on every notification,
/// publishes the decoded snapshot, arms the orchestrator's timers and lets
/// the bot engine act. Intents are sent on behalf of the local player.
///
/// Dropping the client stops the subscription pump. Timers and bot tasks
/// already armed still fire, and are no-ops if the record moved on.
pub struct RoomClient<S: SharedStore> {
    orchestrator: Orchestrator<S>,
    local: PlayerId,
    snapshots: watch::Receiver<Option<MatchState>>,
    pump: JoinHandle<()>,
}

impl<S: SharedStore> RoomClient<S> {
    /// Subscribe to `room_id` and start reacting to its snapshots.
    pub async fn connect(
        room_id: impl Into<String>,
        local: impl Into<PlayerId>,
        store: Arc<S>,
        decks: Arc<DeckLibrary>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let orchestrator = Orchestrator::new(room_id, store, decks, config);
        let bots = BotEngine::new(orchestrator.clone());
        let subscription = orchestrator
            .store()
            .subscribe(&match_path(orchestrator.room_id()))
            .await?;

        let (tx, snapshots) = watch::channel(None);
        let pump = tokio::spawn(pump(subscription, orchestrator.clone(), bots, tx));

        Ok(Self {
            orchestrator,
            local: local.into(),
            snapshots,
            pump,
        })
    }

    #[must_use]
    pub fn local_player(&self) -> &PlayerId {
        &self.local
    }

    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator<S> {
        &self.orchestrator
    }

    /// Snapshot stream for the presentation layer. `None` means no match.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<Option<MatchState>> {
        self.snapshots.clone()
    }

    /// Most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<MatchState> {
        self.snapshots.borrow().clone()
    }

    // === Intents ===

    pub async fn start_match(&self, players: Vec<Seat>, deck_id: &str) -> Result<Transition, EngineError> {
        self.orchestrator.start_match(players, deck_id).await
    }

    pub async fn submit_card(&self, card: &CardId) -> Result<Transition, EngineError> {
        self.orchestrator.submit_card(&self.local, card).await
    }

    pub async fn submit_attribute(&self, attribute: &AttributeKey) -> Result<Transition, EngineError> {
        self.orchestrator.submit_attribute(&self.local, attribute).await
    }

    pub async fn advance_next_round(&self) -> Result<Transition, EngineError> {
        self.orchestrator.advance_next_round(&self.local).await
    }

    pub async fn return_to_lobby(&self) -> Result<Transition, EngineError> {
        self.orchestrator.return_to_lobby(&self.local).await
    }
}

impl<S: SharedStore> Drop for RoomClient<S> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump<S: SharedStore>(
    mut subscription: Subscription,
    orchestrator: Orchestrator<S>,
    bots: BotEngine<S>,
    tx: watch::Sender<Option<MatchState>>,
) {
    while let Some(value) = subscription.next().await {
        let snapshot = match value.map(serde_json::from_value::<MatchState>).transpose() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(room = %orchestrator.room_id(), error = %e, "skipping malformed match record");
                continue;
            }
        };

        match &snapshot {
            Some(state) => {
                orchestrator.react(state);
                bots.react(state);
            }
            None => {
                orchestrator.forget_timers();
                bots.forget();
            }
        }
        tx.send_replace(snapshot);
    }
    debug!(room = %orchestrator.room_id(), "subscription closed");
}
