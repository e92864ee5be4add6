//! Rotation timing state machine.
//!
//! `Idle -> Waiting` on start, `Waiting -> Animating` when the timer fires, and back to
//! `Waiting` either right after dispatch (`fixed` timing, wheel mode) or once the cascade
//! settles (`pause` timing in flip mode). Every transition that arms the timer hands back
//! the delay to arm it with; the caller owns the actual timer.

use std::time::Duration;

use shared::domain::{Mode, TimingMode, WordIndex};

use crate::config::{DEFAULT_FIRST_WORD_INTERVAL_MS, DEFAULT_OTHER_WORD_INTERVAL_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Waiting,
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub first: Duration,
    pub other: Duration,
    pub last: Option<Duration>,
}

impl Intervals {
    /// A zero `first` or `other` takes its default; a zero `last` falls back to `other`.
    pub fn new(first: Duration, other: Duration, last: Option<Duration>) -> Self {
        Self {
            first: or_default(first, DEFAULT_FIRST_WORD_INTERVAL_MS),
            other: or_default(other, DEFAULT_OTHER_WORD_INTERVAL_MS),
            last: last.filter(|last| !last.is_zero()),
        }
    }

    /// How long `index` stays on display before the next rotation.
    pub fn interval_for(&self, index: WordIndex, word_count: usize) -> Duration {
        if index.0 == 0 {
            self.first
        } else if index.0 + 1 == word_count {
            self.last.unwrap_or(self.other)
        } else {
            self.other
        }
    }
}

fn or_default(interval: Duration, default_ms: u64) -> Duration {
    if interval.is_zero() {
        Duration::from_millis(default_ms)
    } else {
        interval
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub from: WordIndex,
    pub to: WordIndex,
    pub mode: Mode,
}

#[derive(Debug, Clone)]
pub struct RotationScheduler {
    phase: Phase,
    current: WordIndex,
    word_count: usize,
    mode: Mode,
    timing_mode: TimingMode,
    intervals: Intervals,
}

impl RotationScheduler {
    pub fn new(word_count: usize, mode: Mode, timing_mode: TimingMode, intervals: Intervals) -> Self {
        Self {
            phase: Phase::Idle,
            current: WordIndex(0),
            word_count: word_count.max(1),
            mode,
            timing_mode,
            intervals,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current(&self) -> WordIndex {
        self.current
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn timing_mode(&self) -> TimingMode {
        self.timing_mode
    }

    pub fn intervals(&self) -> Intervals {
        self.intervals
    }

    pub fn interval_for(&self, index: WordIndex) -> Duration {
        self.intervals.interval_for(index, self.word_count)
    }

    /// `Idle -> Waiting`. Returns `None` when already running.
    pub fn start(&mut self) -> Option<Duration> {
        if self.phase != Phase::Idle {
            return None;
        }
        Some(self.arm())
    }

    /// Back to `Idle`; returns whether the rotation was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.phase != Phase::Idle;
        self.phase = Phase::Idle;
        was_running
    }

    /// Timer fired: `Waiting -> Animating`, advancing to the next word.
    pub fn fire(&mut self) -> Option<Dispatch> {
        if self.phase != Phase::Waiting {
            return None;
        }
        let from = self.current;
        self.current = WordIndex((self.current.0 + 1) % self.word_count);
        self.phase = Phase::Animating;
        Some(Dispatch {
            from,
            to: self.current,
            mode: self.mode,
        })
    }

    /// Rearm right after dispatch unless the next rotation waits for the cascade to settle.
    pub fn after_dispatch(&mut self) -> Option<Duration> {
        if self.phase != Phase::Animating || self.gates_on_completion() {
            return None;
        }
        Some(self.arm())
    }

    /// The active transition settled. Rearms if the rotation is still waiting on it.
    pub fn on_transition_complete(&mut self) -> Option<Duration> {
        if self.phase != Phase::Animating {
            return None;
        }
        Some(self.arm())
    }

    /// New word list or mode: back to the first word, `Idle`.
    pub fn reset(&mut self, word_count: usize, mode: Mode) {
        self.phase = Phase::Idle;
        self.current = WordIndex(0);
        self.word_count = word_count.max(1);
        self.mode = mode;
    }

    pub fn set_intervals(&mut self, intervals: Intervals) {
        self.intervals = intervals;
    }

    pub fn set_timing_mode(&mut self, timing_mode: TimingMode) {
        self.timing_mode = timing_mode;
    }

    fn gates_on_completion(&self) -> bool {
        self.mode == Mode::Flip && self.timing_mode == TimingMode::Pause
    }

    fn arm(&mut self) -> Duration {
        self.phase = Phase::Waiting;
        self.interval_for(self.current)
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
