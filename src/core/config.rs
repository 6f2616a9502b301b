//! Engine configuration parameters.
//!
//! Timings are stored in milliseconds so the config reads naturally from
//! JSON. The presentation layer's animations are paced by these delays, so
//! every client in a room should run with the same values.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::player::Difficulty;

/// Inclusive millisecond range for a randomized delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

/// Bot "thinking" delay ranges per difficulty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingDelays {
    pub easy: DelayRange,
    pub medium: DelayRange,
    pub hard: DelayRange,
}

impl ThinkingDelays {
    /// Delay range for a difficulty.
    #[must_use]
    pub fn for_difficulty(&self, difficulty: Difficulty) -> DelayRange {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

impl Default for ThinkingDelays {
    fn default() -> Self {
        Self {
            easy: DelayRange::new(1500, 3000),
            medium: DelayRange::new(1000, 2000),
            hard: DelayRange::new(500, 1200),
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lead-reveal spin before the first selection of each match.
    pub spin_delay_ms: u64,

    /// Pause after all cards and the attribute are in, before comparing.
    pub reveal_delay_ms: u64,

    /// Pause in `comparing` before the resolver runs.
    pub compare_delay_ms: u64,

    /// Win animation before the round outcome is applied.
    pub win_delay_ms: u64,

    /// Apply the round outcome automatically after `win_delay_ms`.
    /// When false, only the host's `advance_next_round` applies it.
    pub auto_advance: bool,

    pub thinking: ThinkingDelays,

    /// Pause before a timer step that failed on a store error is re-armed.
    pub retry_delay_ms: u64,

    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spin_delay_ms: 3000,
            reveal_delay_ms: 1500,
            compare_delay_ms: 1500,
            win_delay_ms: 3000,
            auto_advance: true,
            thinking: ThinkingDelays::default(),
            retry_delay_ms: 1000,
            seed: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn spin_delay(&self) -> Duration {
        Duration::from_millis(self.spin_delay_ms)
    }

    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    #[must_use]
    pub fn compare_delay(&self) -> Duration {
        Duration::from_millis(self.compare_delay_ms)
    }

    #[must_use]
    pub fn win_delay(&self) -> Duration {
        Duration::from_millis(self.win_delay_ms)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Create a new config with custom seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create a new config with auto-advance switched on or off.
    #[must_use]
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    /// Create a new config with all phase delays set to `ms`.
    #[must_use]
    pub fn with_phase_delays(mut self, ms: u64) -> Self {
        self.spin_delay_ms = ms;
        self.reveal_delay_ms = ms;
        self.compare_delay_ms = ms;
        self.win_delay_ms = ms;
        self
    }

    /// Create a new config with custom bot thinking delays.
    #[must_use]
    pub fn with_thinking(mut self, thinking: ThinkingDelays) -> Self {
        self.thinking = thinking;
        self
    }
}
