//! Numeric session state.

use serde::{Deserialize, Serialize};

/// Stress level every session starts from.
pub const INITIAL_STRESS: i32 = 20;
/// Confidence level every session starts from.
pub const INITIAL_CONFIDENCE: i32 = 60;
/// Rounds in a standard session.
pub const DEFAULT_TOTAL_ROUNDS: u32 = 10;

const COUNTER_MIN: i32 = 0;
const COUNTER_MAX: i32 = 100;

/// Lifecycle phase of a session. The three non-initial phases are terminal;
/// there are no transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    InProgress,
    /// Stress hit the ceiling.
    Collapsed,
    /// The full round count was played out.
    Completed,
    /// The participant quit.
    Abandoned,
}

/// The bounded counters driving session termination.
///
/// Owned exclusively by the session engine and mutated only through its
/// transition function. Both counters are clamped to `[0, 100]` on every
/// update; `round` only ever increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub stress: i32,
    pub confidence: i32,
    pub round: u32,
    pub total_rounds: u32,
    pub phase: SessionPhase,
}

impl SessionState {
    pub fn new(total_rounds: u32) -> Self {
        Self {
            stress: INITIAL_STRESS,
            confidence: INITIAL_CONFIDENCE,
            round: 1,
            total_rounds,
            phase: SessionPhase::InProgress,
        }
    }

    /// Applies a stress delta, clamped to the counter range.
    pub fn apply_stress(&mut self, delta: i32) {
        self.stress = (self.stress + delta).clamp(COUNTER_MIN, COUNTER_MAX);
    }

    /// Applies a confidence delta, clamped to the counter range.
    pub fn apply_confidence(&mut self, delta: i32) {
        self.confidence = (self.confidence + delta).clamp(COUNTER_MIN, COUNTER_MAX);
    }

    /// Whether stress has reached the collapse ceiling.
    pub fn collapsed(&self) -> bool {
        self.stress >= COUNTER_MAX
    }

    pub fn is_terminal(&self) -> bool {
        self.phase != SessionPhase::InProgress
    }
}
