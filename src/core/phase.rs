//! Match phase definitions and legal transitions.
//!
//! One enum covers every phase a room passes through once a match starts.
//! Each phase declares which phases may precede it, so a transition is
//! legal iff `to.predecessors()` contains `from`.
//!
//! ```text
//! spinning -> selecting -> revealing -> comparing -> animating-win -+-> selecting
//!                                                                   +-> finished
//! ```

use serde::{Deserialize, Serialize};

/// Match phase, persisted as `gamePhase`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    /// Lead reveal animation at match start.
    Spinning,
    /// Players submit cards; the lead also nominates the attribute.
    Selecting,
    /// All submissions are in; cards are flipped.
    Revealing,
    /// The resolver runs.
    Comparing,
    /// Round winner is shown; the outcome is applied on exit.
    AnimatingWin,
    /// Terminal: `matchWinner` is set.
    Finished,
}

impl GamePhase {
    /// All phases, in loop order.
    pub const ALL: [GamePhase; 6] = [
        GamePhase::Spinning,
        GamePhase::Selecting,
        GamePhase::Revealing,
        GamePhase::Comparing,
        GamePhase::AnimatingWin,
        GamePhase::Finished,
    ];

    /// Phases from which this phase may be entered.
    ///
    /// `Spinning` has none: it is only entered by starting a match.
    #[must_use]
    pub fn predecessors(self) -> &'static [GamePhase] {
        match self {
            GamePhase::Spinning => &[],
            GamePhase::Selecting => &[GamePhase::Spinning, GamePhase::AnimatingWin],
            GamePhase::Revealing => &[GamePhase::Selecting],
            GamePhase::Comparing => &[GamePhase::Revealing],
            GamePhase::AnimatingWin => &[GamePhase::Comparing],
            GamePhase::Finished => &[GamePhase::AnimatingWin],
        }
    }

    /// Check whether `self -> to` is a declared transition.
    #[must_use]
    pub fn can_transition_to(self, to: GamePhase) -> bool {
        to.predecessors().contains(&self)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == GamePhase::Finished
    }

    /// Wire name, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Spinning => "spinning",
            GamePhase::Selecting => "selecting",
            GamePhase::Revealing => "revealing",
            GamePhase::Comparing => "comparing",
            GamePhase::AnimatingWin => "animating-win",
            GamePhase::Finished => "finished",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
