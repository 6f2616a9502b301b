//! Game phase orchestrator.
//!
//! Every client of a room runs one `Orchestrator`. It owns no state of its
//! own: each intent or timer re-reads the freshest record, checks its
//! preconditions, and persists the transition as a single conditional
//! write guarded on the phase and round it was computed from. Whichever
//! client satisfies the guard first owns the transition; everyone else gets
//! `Transition::Ignored`.
//!
//! ## Key Types
//!
//! - `Orchestrator`: intents and timer-driven phase advances for one room
//! - `Transition`: whether an intent changed the record
//! - `IgnoreReason`: why a duplicate, stale or out-of-turn intent was dropped
//! - `RoomClient`: subscription pump fanning snapshots out to the
//!   presentation layer, the timers and the bot engine

pub mod client;
pub mod machine;
pub mod timers;

use thiserror::Error;

use crate::core::GamePhase;

pub use client::RoomClient;
pub use machine::Orchestrator;
pub use timers::Step;

/// Outcome of an intent or timer step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The record was changed.
    Applied,
    /// Preconditions did not hold. Nothing was written.
    Ignored(IgnoreReason),
}

impl Transition {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Why an intent was a no-op.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IgnoreReason {
    #[error("no match in progress")]
    NoMatch,

    #[error("a match is already in progress")]
    MatchInProgress,

    #[error("the room has started another match")]
    StaleMatch,

    #[error("expected phase {expected}, found {actual}")]
    WrongPhase { expected: GamePhase, actual: GamePhase },

    #[error("round {expected} is over, now in round {actual}")]
    StaleRound { expected: u32, actual: u32 },

    #[error("player is not active in this match")]
    NotActive,

    #[error("card already submitted this round")]
    AlreadySubmitted,

    #[error("card is not in the player's hand")]
    CardNotInHand,

    #[error("only the lead nominates the attribute")]
    NotLead,

    #[error("the lead has not played yet")]
    LeadHasNotPlayed,

    #[error("attribute already nominated this round")]
    AttributeAlreadySelected,

    #[error("no attribute nominated this round")]
    AttributeNotSelected,

    #[error("attribute is not exposed by the deck")]
    UnknownAttribute,

    #[error("only the host may do this")]
    NotHost,

    #[error("not every card and the attribute are in")]
    NotReady,

    #[error("round already resolved")]
    AlreadyResolved,

    #[error("another client applied a conflicting write first")]
    LostRace,
}
