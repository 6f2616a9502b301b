//! Timer-driven phase advances.
//!
//! Timers are never cancelled. Each one names the match and round it was
//! armed for and re-reads the record when it fires, so a timer that
//! outlived its phase is a no-op.

use std::time::Duration;

use tracing::{trace, warn};

use super::machine::Orchestrator;
use super::{IgnoreReason, Transition};
use crate::core::{EngineError, GamePhase, MatchState};
use crate::store::SharedStore;

/// A phase advance a timer can fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// `spinning -> selecting`
    EndSpin,
    /// `selecting -> revealing`
    Reveal,
    /// `revealing -> comparing`
    Compare,
    /// `comparing -> animating-win`
    Resolve,
    /// `animating-win -> selecting | finished`
    Advance,
}

impl<S: SharedStore> Orchestrator<S> {
    /// Arm whatever timer the snapshot's phase calls for.
    ///
    /// Each `(match, round, step)` is armed at most once per client. A step
    /// that failed with a store error is re-armed after the retry delay.
    pub fn react(&self, state: &MatchState) {
        self.inner.scheduled.lock().retain(|(match_id, round, _)| {
            match_id == &state.match_id && *round >= state.current_round
        });

        let config = self.config();
        let armed = match state.game_phase {
            GamePhase::Spinning => Some((Step::EndSpin, config.spin_delay())),
            GamePhase::Selecting if state.ready_to_reveal() => Some((Step::Reveal, Duration::ZERO)),
            GamePhase::Revealing => Some((Step::Compare, config.reveal_delay())),
            GamePhase::Comparing => Some((Step::Resolve, config.compare_delay())),
            GamePhase::AnimatingWin if config.auto_advance => Some((Step::Advance, config.win_delay())),
            _ => None,
        };

        if let Some((step, delay)) = armed {
            self.schedule(step, &state.match_id, state.current_round, delay);
        }
    }

    /// Drop every timer marker. Called when the room has no match.
    pub fn forget_timers(&self) {
        self.inner.scheduled.lock().clear();
    }

    fn schedule(&self, step: Step, match_id: &str, round: u32, delay: Duration) {
        let key = (match_id.to_string(), round, step);
        if !self.inner.scheduled.lock().insert(key.clone()) {
            return;
        }
        trace!(room = %self.room_id(), round, ?step, ?delay, "timer armed");

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match this.run_armed(step, &key.0, round).await {
                Ok(Transition::Applied) => {}
                Ok(Transition::Ignored(reason)) => {
                    trace!(room = %this.room_id(), round, ?step, %reason, "timer was a no-op");
                }
                Err(e) => {
                    warn!(room = %this.room_id(), round, ?step, error = %e, "timer step failed, retrying");
                    this.inner.scheduled.lock().remove(&key);
                    this.retry_after(this.config().retry_delay()).await;
                }
            }
        });
    }

    /// Run `step` unless the room has moved on to another match.
    async fn run_armed(&self, step: Step, match_id: &str, round: u32) -> Result<Transition, EngineError> {
        match self.snapshot().await? {
            Some(state) if state.match_id == match_id => self.run_step(step, round).await,
            Some(_) => Ok(Transition::Ignored(IgnoreReason::StaleMatch)),
            None => Ok(Transition::Ignored(IgnoreReason::NoMatch)),
        }
    }

    /// Re-read the record after a failed step and arm whatever it calls for.
    async fn retry_after(&self, pause: Duration) {
        loop {
            tokio::time::sleep(pause).await;
            match self.snapshot().await {
                Ok(Some(state)) => return self.react(&state),
                Ok(None) => return,
                Err(e) => warn!(room = %self.room_id(), error = %e, "timer retry could not read the match"),
            }
        }
    }

    /// Fire one step for `round` now.
    pub async fn run_step(&self, step: Step, round: u32) -> Result<Transition, EngineError> {
        match step {
            Step::EndSpin => self.end_spin(round).await,
            Step::Reveal => self.try_reveal().await,
            Step::Compare => self.begin_compare(round).await,
            Step::Resolve => self.resolve_round(round).await,
            Step::Advance => self.finish_round(round).await,
        }
    }
}
