// src/debounce.rs - Majority-vote smoothing over recent frame labels
use crate::adapter::Category;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const HISTORY_LEN: usize = 5;
const MAJORITY: usize = 3;
const DETECT_FREEZE: Duration = Duration::from_millis(2000);
const MANUAL_FREEZE: Duration = Duration::from_millis(1000);

/// The single active gesture classification driving the visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalState {
    Relaxed,
    Pen,
    Phone,
    Key,
    /// Only reachable through a manual trigger, never via detection.
    Salute,
}

impl LogicalState {
    pub fn caption(&self) -> &'static str {
        match self {
            LogicalState::Relaxed => "State: RELAXED",
            LogicalState::Pen => "State: PEN detected",
            LogicalState::Phone => "State: PHONE detected",
            LogicalState::Key => "State: KEY detected",
            LogicalState::Salute => "State: Salute (simulation)",
        }
    }
}

impl From<Category> for LogicalState {
    fn from(category: Category) -> Self {
        match category {
            Category::None => LogicalState::Relaxed,
            Category::Pen => LogicalState::Pen,
            Category::Phone => LogicalState::Phone,
            Category::Key => LogicalState::Key,
        }
    }
}

/// What a single observed frame did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Majority reached, transition committed, freeze window armed.
    Committed(LogicalState),
    /// Frame label was `none`; state dropped straight back to relaxed.
    Relaxed,
    /// Minority non-none label; neither commits nor reverts.
    Unchanged,
}

/// Smooths per-frame labels into committed state transitions.
///
/// A label must hold a majority (3 of the last 5 frames) before its state is
/// trusted; `none` is never smoothed on the way down. Callers are expected to
/// stop feeding frames while `frozen` reports true - the history deliberately
/// does not advance during a freeze window.
pub struct Debouncer {
    history: VecDeque<Category>,
    state: LogicalState,
    freeze_until: Option<Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LEN),
            state: LogicalState::Relaxed,
            freeze_until: None,
        }
    }

    pub fn state(&self) -> LogicalState {
        self.state
    }

    pub fn frozen(&self, now: Instant) -> bool {
        self.freeze_until.map_or(false, |until| now < until)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Feeds one frame's mapped label into the history and applies the
    /// transition rule.
    pub fn observe(&mut self, label: Category, now: Instant) -> Verdict {
        self.history.push_back(label);
        if self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }

        let count_same = self.history.iter().filter(|c| **c == label).count();

        if count_same >= MAJORITY && label != Category::None {
            // Re-committing an already active state still renews the freeze.
            self.state = label.into();
            self.freeze_until = Some(now + DETECT_FREEZE);
            Verdict::Committed(self.state)
        } else if label == Category::None {
            self.state = LogicalState::Relaxed;
            Verdict::Relaxed
        } else {
            Verdict::Unchanged
        }
    }

    /// Manual override: sets the state directly, skipping the history.
    ///
    /// Non-relaxed targets arm the shorter manual freeze; the relaxed target
    /// clears any pending freeze instead.
    pub fn simulate(&mut self, state: LogicalState, now: Instant) {
        self.state = state;
        self.freeze_until = if state == LogicalState::Relaxed {
            None
        } else {
            Some(now + MANUAL_FREEZE)
        };
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
