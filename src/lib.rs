//! # trumps-engine
//!
//! Game engine for a real-time multiplayer "Top Trumps"-style card game.
//!
//! Players are dealt cards from a themed deck. Each round every active
//! player submits a card and the lead nominates a numeric attribute; the
//! best value under that attribute's comparison rule takes every card
//! played and leads the next round. Players with no cards left are
//! eliminated, and the last one standing wins.
//!
//! ## Design Principles
//!
//! 1. **No Coordinator**: Clients share state only through a `SharedStore`.
//!    Every client runs the same orchestrator and bot engine against it.
//!
//! 2. **One Write Per Transition**: Each phase transition is a single
//!    conditional write guarded on the phase and round it was computed
//!    from. Duplicate, stale and out-of-turn intents are no-ops.
//!
//! 3. **Pure Resolution**: Dealing and round resolution are pure functions
//!    of the snapshot plus a seeded RNG.
//!
//! ## Modules
//!
//! - `core`: Players, phases, match state, RNG, configuration, errors
//! - `cards`: Card definitions, decks, shuffling and dealing
//! - `rules`: Round comparison, collection and elimination
//! - `store`: `SharedStore` trait and the in-memory store
//! - `orchestrator`: Phase state machine, timers and `RoomClient`
//! - `bots`: Difficulty strategies and the bot engine

pub mod bots;
pub mod cards;
pub mod core;
pub mod orchestrator;
pub mod rules;
pub mod store;

// Re-export commonly used types
pub use crate::core::{
    Difficulty, EngineConfig, EngineError, GamePhase, GameRng, MatchState, PlayerId, PlayerStatus,
    RoundRecord, Seat, StoreError,
};

pub use crate::cards::{AttributeKey, AttributeSpec, Card, CardId, ComparisonRule, Deck, DeckLibrary};

pub use crate::rules::{check_game_end, collect_and_advance, compare_round, RoundResult};

pub use crate::store::{MemoryStore, SharedStore};

pub use crate::orchestrator::{IgnoreReason, Orchestrator, RoomClient, Transition};

pub use crate::bots::{strategy_for, BotEngine, BotStrategy};
