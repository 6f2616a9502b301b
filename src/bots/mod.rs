//! Computer-controlled seats.
//!
//! - `strategy`: `BotStrategy` and the three difficulty strategies
//! - `engine`: `BotEngine`, which watches snapshots and submits intents for
//!   bot seats through the orchestrator like any other client

pub mod engine;
pub mod strategy;

pub use engine::{pending_action, BotAction, BotEngine};
pub use strategy::{strategy_for, BotStrategy, MaxValueStrategy, RandomStrategy, RelativeStrategy};
