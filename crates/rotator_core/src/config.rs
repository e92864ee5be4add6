use std::time::Duration;

use serde::Deserialize;
use shared::domain::{Mode, TimingMode};

use crate::{error::RotatorError, scheduler::Intervals, words::DEFAULT_WORDS};

pub const DEFAULT_FIRST_WORD_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_OTHER_WORD_INTERVAL_MS: u64 = 500;
pub const DEFAULT_CASCADE_DELAY_MS: u64 = 40;
pub const DEFAULT_FLIP_SPEED_MS: u64 = 35;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RotatorConfig {
    pub words: Vec<String>,
    pub mode: Mode,
    pub first_word_interval_ms: u64,
    pub other_word_interval_ms: u64,
    /// Falls back to `other_word_interval_ms` when unset or zero.
    pub last_word_interval_ms: Option<u64>,
    pub timing_mode: TimingMode,
    pub cascade_delay_ms: u64,
    pub flip_speed_ms: u64,
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|word| word.to_string()).collect(),
            mode: Mode::default(),
            first_word_interval_ms: DEFAULT_FIRST_WORD_INTERVAL_MS,
            other_word_interval_ms: DEFAULT_OTHER_WORD_INTERVAL_MS,
            last_word_interval_ms: None,
            timing_mode: TimingMode::default(),
            cascade_delay_ms: DEFAULT_CASCADE_DELAY_MS,
            flip_speed_ms: DEFAULT_FLIP_SPEED_MS,
        }
    }
}

impl RotatorConfig {
    pub fn validate(&self) -> Result<(), RotatorError> {
        if self.flip_speed_ms == 0 {
            return Err(RotatorError::ZeroFlipSpeed);
        }
        Ok(())
    }

    /// Zero intervals fall back to their defaults.
    pub fn intervals(&self) -> Intervals {
        Intervals::new(
            Duration::from_millis(self.first_word_interval_ms),
            Duration::from_millis(self.other_word_interval_ms),
            self.last_word_interval_ms.map(Duration::from_millis),
        )
    }

    pub fn cascade_timing(&self) -> CascadeTiming {
        CascadeTiming {
            cascade_delay: Duration::from_millis(self.cascade_delay_ms),
            flip_speed: Duration::from_millis(self.flip_speed_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeTiming {
    /// Offset between consecutive slots starting to cycle.
    pub cascade_delay: Duration,
    /// Duration of one single-step flip.
    pub flip_speed: Duration,
}

impl Default for CascadeTiming {
    fn default() -> Self {
        RotatorConfig::default().cascade_timing()
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
