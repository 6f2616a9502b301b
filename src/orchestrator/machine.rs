//! Intents and phase advances for one room.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use super::timers::Step;
use super::{IgnoreReason, Transition};
use crate::cards::{deal, pick_lead, shuffle, AttributeKey, CardId, DealError, Deck, DeckLibrary};
use crate::core::{
    EngineConfig, EngineError, GamePhase, GameRng, MatchState, PlayerId, PlayerStatus, Seat,
};
use crate::rules::{collect_and_advance, compare_round, round_record};
use crate::store::{match_path, Patch, SharedStore};

pub(super) struct Inner<S> {
    pub(super) room_id: String,
    pub(super) store: Arc<S>,
    pub(super) decks: Arc<DeckLibrary>,
    pub(super) config: EngineConfig,
    pub(super) rng: Mutex<GameRng>,
    /// Timer steps already spawned by this client, by match and round.
    pub(super) scheduled: Mutex<FxHashSet<(String, u32, Step)>>,
}

/// Phase state machine for one room, as seen by one client.
///
/// Cheap to clone; clones share the RNG and timer bookkeeping.
pub struct Orchestrator<S> {
    pub(super) inner: Arc<Inner<S>>,
}

impl<S> Clone for Orchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SharedStore> Orchestrator<S> {
    #[must_use]
    pub fn new(
        room_id: impl Into<String>,
        store: Arc<S>,
        decks: Arc<DeckLibrary>,
        config: EngineConfig,
    ) -> Self {
        let rng = GameRng::from_seed(config.seed);
        Self {
            inner: Arc::new(Inner {
                room_id: room_id.into(),
                store,
                decks,
                config,
                rng: Mutex::new(rng),
                scheduled: Mutex::new(FxHashSet::default()),
            }),
        }
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.inner.room_id
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    /// Look up a deck in the library.
    pub fn deck(&self, deck_id: &str) -> Result<Arc<Deck>, EngineError> {
        self.inner
            .decks
            .get(deck_id)
            .ok_or_else(|| EngineError::UnknownDeck(deck_id.to_string()))
    }

    /// Read and decode the room's current match record.
    pub async fn snapshot(&self) -> Result<Option<MatchState>, EngineError> {
        let value = self.inner.store.read(&match_path(self.room_id())).await?;
        Ok(value.map(serde_json::from_value).transpose()?)
    }

    // === Write Helpers ===

    /// Patch rooted at this room's record.
    pub(crate) fn record(&self) -> Patch {
        Patch::new(match_path(self.room_id()))
    }

    /// Patch guarded on the phase and round `state` was read at.
    fn guarded(&self, state: &MatchState) -> Patch {
        self.record()
            .require("gamePhase", state.game_phase)
            .require("currentRound", state.current_round)
    }

    async fn commit(&self, patch: Patch) -> Result<Transition, EngineError> {
        let (guards, updates) = patch.build();
        if self.inner.store.write_if(&guards, updates).await? {
            Ok(Transition::Applied)
        } else {
            Ok(self.ignore(IgnoreReason::LostRace))
        }
    }

    fn ignore(&self, reason: IgnoreReason) -> Transition {
        debug!(room = %self.room_id(), %reason, "transition ignored");
        Transition::Ignored(reason)
    }

    /// Read the record and check it is in `phase` at `round`.
    async fn load_at(&self, phase: GamePhase, round: u32) -> Result<Result<MatchState, Transition>, EngineError> {
        let Some(state) = self.snapshot().await? else {
            return Ok(Err(self.ignore(IgnoreReason::NoMatch)));
        };
        if state.current_round != round {
            return Ok(Err(self.ignore(IgnoreReason::StaleRound {
                expected: round,
                actual: state.current_round,
            })));
        }
        if state.game_phase != phase {
            return Ok(Err(self.ignore(IgnoreReason::WrongPhase {
                expected: phase,
                actual: state.game_phase,
            })));
        }
        Ok(Ok(state))
    }

    /// Move `state` to the next phase, guarded on where it was read.
    async fn advance_phase(&self, state: &MatchState, to: GamePhase) -> Result<Transition, EngineError> {
        debug_assert!(state.game_phase.can_transition_to(to));
        let transition = self.commit(self.guarded(state).set("gamePhase", to)).await?;
        if transition.is_applied() {
            debug!(room = %self.room_id(), round = state.current_round, from = %state.game_phase, %to, "phase advanced");
        }
        Ok(transition)
    }

    // === Intents ===

    /// Deal a new match and enter `spinning`.
    ///
    /// All input is validated before anything is written. Ignored if the
    /// room already has a match record.
    pub async fn start_match(&self, players: Vec<Seat>, deck_id: &str) -> Result<Transition, EngineError> {
        let deck = self.deck(deck_id)?;
        let ids: Vec<PlayerId> = players.iter().map(|s| s.nickname.clone()).collect();

        let (hands, lead, seed) = {
            let mut rng = self.inner.rng.lock();
            let cards = shuffle(&deck.card_ids(), &mut rng);
            let hands = deal(&cards, &ids)?;
            let lead = pick_lead(&ids, &mut rng).ok_or(DealError::NotEnoughPlayers(ids.len()))?;
            (hands, lead, rng.seed())
        };

        let players = players
            .into_iter()
            .map(|mut seat| {
                seat.status = PlayerStatus::Active;
                seat
            })
            .collect();
        let state = MatchState::new(deck.id(), players, hands, lead);

        let patch = self.record().require_absent("gamePhase").replace(&state);
        let (guards, updates) = patch.build();
        if !self.inner.store.write_if(&guards, updates).await? {
            return Ok(self.ignore(IgnoreReason::MatchInProgress));
        }

        info!(
            room = %self.room_id(),
            deck = deck_id,
            players = ids.len(),
            cards = deck.len(),
            lead = %state.current_player,
            seed,
            "match started"
        );
        Ok(Transition::Applied)
    }

    /// Submit `player`'s card for the current round.
    ///
    /// Guarded by an absence check on the player's play, so repeating the
    /// same submission is a no-op.
    pub async fn submit_card(&self, player: &PlayerId, card: &CardId) -> Result<Transition, EngineError> {
        let Some(state) = self.snapshot().await? else {
            return Ok(self.ignore(IgnoreReason::NoMatch));
        };
        if state.game_phase != GamePhase::Selecting {
            return Ok(self.ignore(IgnoreReason::WrongPhase {
                expected: GamePhase::Selecting,
                actual: state.game_phase,
            }));
        }
        if !state.is_active(player) {
            return Ok(self.ignore(IgnoreReason::NotActive));
        }
        if state.has_played(player) {
            return Ok(self.ignore(IgnoreReason::AlreadySubmitted));
        }
        if !state.holds_card(player, card) {
            return Ok(self.ignore(IgnoreReason::CardNotInHand));
        }

        let field = format!("currentRoundPlays/{player}");
        let patch = self.guarded(&state).require_absent(&field).set(&field, card);
        let transition = self.commit(patch).await?;
        if transition.is_applied() {
            debug!(room = %self.room_id(), round = state.current_round, %player, %card, "card submitted");
            self.reveal_after_submit(state.current_round).await;
        }
        Ok(transition)
    }

    /// Nominate the round's attribute. Lead only, after the lead has played.
    pub async fn submit_attribute(
        &self,
        player: &PlayerId,
        attribute: &AttributeKey,
    ) -> Result<Transition, EngineError> {
        let Some(state) = self.snapshot().await? else {
            return Ok(self.ignore(IgnoreReason::NoMatch));
        };
        if state.game_phase != GamePhase::Selecting {
            return Ok(self.ignore(IgnoreReason::WrongPhase {
                expected: GamePhase::Selecting,
                actual: state.game_phase,
            }));
        }
        if &state.current_player != player {
            return Ok(self.ignore(IgnoreReason::NotLead));
        }
        if !state.lead_has_played() {
            return Ok(self.ignore(IgnoreReason::LeadHasNotPlayed));
        }
        if state.selected_attribute.is_some() {
            return Ok(self.ignore(IgnoreReason::AttributeAlreadySelected));
        }
        if !self.deck(&state.deck_id)?.exposes(attribute) {
            return Ok(self.ignore(IgnoreReason::UnknownAttribute));
        }

        let patch = self
            .guarded(&state)
            .require("currentPlayer", player)
            .require_absent("selectedAttribute")
            .set("selectedAttribute", attribute);
        let transition = self.commit(patch).await?;
        if transition.is_applied() {
            info!(room = %self.room_id(), round = state.current_round, %player, %attribute, "attribute nominated");
            self.reveal_after_submit(state.current_round).await;
        }
        Ok(transition)
    }

    /// Host-triggered application of the resolved round.
    pub async fn advance_next_round(&self, invoker: &PlayerId) -> Result<Transition, EngineError> {
        let Some(state) = self.snapshot().await? else {
            return Ok(self.ignore(IgnoreReason::NoMatch));
        };
        if !state.seat(invoker).is_some_and(|s| s.is_host) {
            return Ok(self.ignore(IgnoreReason::NotHost));
        }
        self.finish_round(state.current_round).await
    }

    /// Delete the match record. Host only.
    pub async fn return_to_lobby(&self, invoker: &PlayerId) -> Result<Transition, EngineError> {
        let Some(state) = self.snapshot().await? else {
            return Ok(self.ignore(IgnoreReason::NoMatch));
        };
        if !state.seat(invoker).is_some_and(|s| s.is_host) {
            return Ok(self.ignore(IgnoreReason::NotHost));
        }

        let (_, updates) = self.record().replace(serde_json::Value::Null).build();
        self.inner.store.write(updates).await?;
        info!(room = %self.room_id(), round = state.current_round, "returned to lobby");
        Ok(Transition::Applied)
    }

    // === Phase Advances ===

    /// `spinning -> selecting`.
    pub async fn end_spin(&self, round: u32) -> Result<Transition, EngineError> {
        match self.load_at(GamePhase::Spinning, round).await? {
            Ok(state) => self.advance_phase(&state, GamePhase::Selecting).await,
            Err(ignored) => Ok(ignored),
        }
    }

    /// `selecting -> revealing` once every card and the attribute are in.
    ///
    /// Safe to call at any time; attempted after every submission and on
    /// every snapshot.
    pub async fn try_reveal(&self) -> Result<Transition, EngineError> {
        let Some(state) = self.snapshot().await? else {
            return Ok(self.ignore(IgnoreReason::NoMatch));
        };
        if !state.ready_to_reveal() {
            return Ok(Transition::Ignored(IgnoreReason::NotReady));
        }
        self.advance_phase(&state, GamePhase::Revealing).await
    }

    /// Attempt the reveal once a submission landed. The submission stands
    /// either way; a failed reveal is retried by the `Reveal` timer.
    async fn reveal_after_submit(&self, round: u32) {
        if let Err(e) = self.try_reveal().await {
            warn!(room = %self.room_id(), round, error = %e, "reveal after submission failed");
        }
    }

    /// `revealing -> comparing`.
    pub async fn begin_compare(&self, round: u32) -> Result<Transition, EngineError> {
        match self.load_at(GamePhase::Revealing, round).await? {
            Ok(state) => self.advance_phase(&state, GamePhase::Comparing).await,
            Err(ignored) => Ok(ignored),
        }
    }

    /// `comparing -> animating-win`: resolve the round and record it.
    pub async fn resolve_round(&self, round: u32) -> Result<Transition, EngineError> {
        let state = match self.load_at(GamePhase::Comparing, round).await? {
            Ok(state) => state,
            Err(ignored) => return Ok(ignored),
        };
        if state.round_winner.is_some() {
            return Ok(self.ignore(IgnoreReason::AlreadyResolved));
        }
        let Some(attribute) = state.selected_attribute.clone() else {
            return Ok(self.ignore(IgnoreReason::AttributeNotSelected));
        };

        let deck = self.deck(&state.deck_id)?;
        let result = compare_round(&state.current_round_plays, &attribute, &deck, &state.seat_order());
        let mut history = state.round_history.clone();
        history.push_back(round_record(round, &result));

        let patch = self
            .guarded(&state)
            .require_absent("roundWinner")
            .set("roundWinner", &result.winner)
            .set("roundHistory", &history)
            .set("gamePhase", GamePhase::AnimatingWin);
        let transition = self.commit(patch).await?;
        if transition.is_applied() {
            info!(
                room = %self.room_id(),
                round,
                %attribute,
                winner = result.winner.as_ref().map_or("none", PlayerId::as_str),
                "round resolved"
            );
        }
        Ok(transition)
    }

    /// `animating-win -> selecting | finished`: apply the recorded outcome.
    pub async fn finish_round(&self, round: u32) -> Result<Transition, EngineError> {
        let state = match self.load_at(GamePhase::AnimatingWin, round).await? {
            Ok(state) => state,
            Err(ignored) => return Ok(ignored),
        };
        let Some(attribute) = state.selected_attribute.clone() else {
            return Ok(self.ignore(IgnoreReason::AttributeNotSelected));
        };

        let deck = self.deck(&state.deck_id)?;
        let mut result = compare_round(&state.current_round_plays, &attribute, &deck, &state.seat_order());
        // The persisted winner is authoritative.
        result.winner = state.round_winner.clone();

        let next = {
            let mut rng = self.inner.rng.lock();
            collect_and_advance(&state, &result, &mut rng)
        };
        debug_assert!(state.game_phase.can_transition_to(next.game_phase));

        let transition = self.commit(self.guarded(&state).replace(&next)).await?;
        if transition.is_applied() {
            for seat in next.players.iter().filter(|s| !s.is_active()) {
                if state.is_active(&seat.nickname) {
                    info!(room = %self.room_id(), round, player = %seat.nickname, "player eliminated");
                }
            }
            match &next.match_winner {
                Some(winner) => info!(room = %self.room_id(), rounds = round, %winner, "match finished"),
                None => debug!(room = %self.room_id(), round = next.current_round, lead = %next.current_player, "next round"),
            }
        }
        Ok(transition)
    }
}
