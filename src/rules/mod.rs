//! Round rules: comparing plays and applying the outcome.
//!
//! The functions here never touch the store. The orchestrator reads a
//! snapshot, runs them, and writes the result back in one conditional
//! write.

pub mod resolver;

pub use resolver::{
    check_game_end, collect_and_advance, compare_round, round_record, PlayerValue, RoundResult,
};
