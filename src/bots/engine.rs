//! Bot driver: turns snapshots into intents for bot seats.
//!
//! Every client runs a `BotEngine`, so every client sees every bot's turn.
//! Two markers keep a bot from acting twice in a round:
//!
//! - a local in-flight set keyed by `(bot, round, action)`, so repeated
//!   notifications on one client arm one task
//! - a persisted claim in `botClaims/{bot}`, taken with a conditional
//!   write, so only one client acts for a bot per round
//!
//! When a store write fails the in-flight marker is dropped and the claim
//! released, and the action is retried after a short pause.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use super::strategy::{strategy_for, BotStrategy};
use crate::core::{BotClaim, Difficulty, EngineError, GamePhase, GameRng, MatchState, PlayerId};
use crate::orchestrator::{Orchestrator, Transition};
use crate::store::SharedStore;

/// What a bot still has to do this round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BotAction {
    PlayCard,
    NominateAttribute,
}

impl BotAction {
    fn claim_field(self) -> &'static str {
        match self {
            BotAction::PlayCard => "card",
            BotAction::NominateAttribute => "attribute",
        }
    }

    fn claimed_round(self, claim: &BotClaim) -> Option<u32> {
        match self {
            BotAction::PlayCard => claim.card,
            BotAction::NominateAttribute => claim.attribute,
        }
    }
}

/// The next action `bot` owes in `state`, if any.
#[must_use]
pub fn pending_action(state: &MatchState, bot: &PlayerId) -> Option<BotAction> {
    if state.game_phase != GamePhase::Selecting || !state.is_active(bot) {
        return None;
    }
    if !state.has_played(bot) {
        Some(BotAction::PlayCard)
    } else if &state.current_player == bot && state.selected_attribute.is_none() {
        Some(BotAction::NominateAttribute)
    } else {
        None
    }
}

/// One bot action in one round of one match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ActionKey {
    match_id: String,
    bot: PlayerId,
    round: u32,
    action: BotAction,
}

impl ActionKey {
    fn claim_field(&self) -> String {
        format!("botClaims/{}/{}", self.bot, self.action.claim_field())
    }
}

enum Acted {
    Submitted,
    Skipped,
}

struct Inner<S> {
    orchestrator: Orchestrator<S>,
    rng: Mutex<GameRng>,
    in_flight: Mutex<FxHashSet<ActionKey>>,
    /// Claims this client currently holds in the store.
    held: Mutex<FxHashSet<ActionKey>>,
}

/// Drives every bot seat of one room from this client.
pub struct BotEngine<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for BotEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SharedStore> BotEngine<S> {
    #[must_use]
    pub fn new(orchestrator: Orchestrator<S>) -> Self {
        // Offset so bot choices do not replay the dealer's stream.
        let rng = GameRng::from_seed(orchestrator.config().seed.map(|s| s.wrapping_add(1)));
        Self {
            inner: Arc::new(Inner {
                orchestrator,
                rng: Mutex::new(rng),
                in_flight: Mutex::new(FxHashSet::default()),
                held: Mutex::new(FxHashSet::default()),
            }),
        }
    }

    /// Arm a thinking task for every bot that owes an action.
    pub fn react(&self, state: &MatchState) {
        let current = |key: &ActionKey| key.match_id == state.match_id && key.round >= state.current_round;
        self.inner.in_flight.lock().retain(current);
        self.inner.held.lock().retain(current);

        for seat in state.active_players() {
            let Some(difficulty) = seat.bot_difficulty() else {
                continue;
            };
            if let Some(action) = pending_action(state, &seat.nickname) {
                let key = ActionKey {
                    match_id: state.match_id.clone(),
                    bot: seat.nickname.clone(),
                    round: state.current_round,
                    action,
                };
                self.schedule(state, key, difficulty);
            }
        }
    }

    /// Drop every in-flight marker and held claim. Called when the room has
    /// no match.
    pub fn forget(&self) {
        self.inner.in_flight.lock().clear();
        self.inner.held.lock().clear();
    }

    fn schedule(&self, state: &MatchState, key: ActionKey, difficulty: Difficulty) {
        let claimed = key.action.claimed_round(&state.bot_claim(&key.bot)) == Some(key.round);
        if claimed && !self.inner.held.lock().contains(&key) {
            trace!(bot = %key.bot, round = key.round, action = ?key.action, "claimed by another client");
            return;
        }
        if !self.inner.in_flight.lock().insert(key.clone()) {
            return;
        }

        let range = self.inner.orchestrator.config().thinking.for_difficulty(difficulty);
        let delay = self.inner.rng.lock().gen_duration(range.min(), range.max());

        let this = self.clone();
        tokio::spawn(async move {
            match this.act(&key, difficulty, delay).await {
                Ok(Acted::Submitted) => {}
                Ok(Acted::Skipped) => {
                    this.inner.in_flight.lock().remove(&key);
                }
                Err(e) => {
                    warn!(bot = %key.bot, round = key.round, action = ?key.action, error = %e, "bot action failed, retrying");
                    this.release(&key).await;
                    this.inner.in_flight.lock().remove(&key);
                    this.retry_after(range.min()).await;
                }
            }
        });
    }

    async fn act(&self, key: &ActionKey, difficulty: Difficulty, delay: Duration) -> Result<Acted, EngineError> {
        let ActionKey { bot, round, action, .. } = key;
        let orchestrator = &self.inner.orchestrator;

        let holds = self.inner.held.lock().contains(key);
        if !holds {
            if !self.claim(key).await? {
                trace!(%bot, round, ?action, "lost claim race");
                return Ok(Acted::Skipped);
            }
            self.inner.held.lock().insert(key.clone());
        }

        tokio::time::sleep(delay).await;

        let Some(state) = orchestrator.snapshot().await? else {
            return Ok(Acted::Skipped);
        };
        if state.match_id != key.match_id
            || state.current_round != *round
            || pending_action(&state, bot) != Some(*action)
        {
            return Ok(Acted::Skipped);
        }

        let deck = orchestrator.deck(&state.deck_id)?;
        let strategy: &dyn BotStrategy = strategy_for(difficulty);

        let transition = match action {
            BotAction::PlayCard => {
                let choice = {
                    let mut rng = self.inner.rng.lock();
                    state.hand(bot).and_then(|hand| strategy.choose_card(hand, &deck, &mut rng))
                };
                let Some(card) = choice else {
                    return Ok(Acted::Skipped);
                };
                debug!(%bot, round, %card, strategy = strategy.name(), "bot plays card");
                orchestrator.submit_card(bot, &card).await?
            }
            BotAction::NominateAttribute => {
                let played = state.current_round_plays.get(bot).and_then(|id| deck.get(id));
                let choice = {
                    let mut rng = self.inner.rng.lock();
                    match played {
                        Some(card) => strategy.choose_attribute(card, &deck, &mut rng),
                        None => rng.choose(deck.attributes()).map(|spec| spec.key.clone()),
                    }
                };
                let Some(attribute) = choice else {
                    return Ok(Acted::Skipped);
                };
                debug!(%bot, round, %attribute, strategy = strategy.name(), "bot nominates attribute");
                orchestrator.submit_attribute(bot, &attribute).await?
            }
        };

        Ok(match transition {
            Transition::Applied => Acted::Submitted,
            Transition::Ignored(_) => Acted::Skipped,
        })
    }

    /// Take the persisted claim for `key`.
    async fn claim(&self, key: &ActionKey) -> Result<bool, EngineError> {
        let orchestrator = &self.inner.orchestrator;
        let Some(state) = orchestrator.snapshot().await? else {
            return Ok(false);
        };
        if state.match_id != key.match_id {
            return Ok(false);
        }
        let current = key.action.claimed_round(&state.bot_claim(&key.bot));
        if current == Some(key.round) {
            return Ok(false);
        }

        let field = key.claim_field();
        let (guards, updates) = orchestrator
            .record()
            .require("matchId", &key.match_id)
            .require("gamePhase", GamePhase::Selecting)
            .require("currentRound", key.round)
            .require(&field, current)
            .set(&field, key.round)
            .build();
        Ok(orchestrator.store().write_if(&guards, updates).await?)
    }

    /// Give up a claim this client holds, if the store accepts the write.
    async fn release(&self, key: &ActionKey) {
        if !self.inner.held.lock().contains(key) {
            return;
        }

        let field = key.claim_field();
        let (guards, updates) = self
            .inner
            .orchestrator
            .record()
            .require("matchId", &key.match_id)
            .require(&field, key.round)
            .clear(&field)
            .build();
        match self.inner.orchestrator.store().write_if(&guards, updates).await {
            Ok(_) => {
                self.inner.held.lock().remove(key);
            }
            // Still held: the retry skips re-claiming.
            Err(e) => debug!(bot = %key.bot, round = key.round, error = %e, "claim release failed"),
        }
    }

    async fn retry_after(&self, pause: Duration) {
        loop {
            tokio::time::sleep(pause).await;
            match self.inner.orchestrator.snapshot().await {
                Ok(Some(state)) => return self.react(&state),
                Ok(None) => return,
                Err(e) => warn!(error = %e, "bot retry could not read the match"),
            }
        }
    }
}
