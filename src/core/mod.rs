//! Core engine types: players, phases, match state, RNG, configuration, errors.
//!
//! Everything here is plain data plus small helpers. The orchestrator and
//! bot engine build their behavior on top of these types.

pub mod config;
pub mod error;
pub mod phase;
pub mod player;
pub mod rng;
pub mod state;

pub use config::{DelayRange, EngineConfig, ThinkingDelays};
pub use error::{EngineError, StoreError};
pub use phase::GamePhase;
pub use player::{Difficulty, PlayerId, PlayerStatus, Seat};
pub use rng::GameRng;
pub use state::{BotClaim, Hand, MatchState, PlayedCard, RoundRecord};
