//! Session configuration.

use super::state::DEFAULT_TOTAL_ROUNDS;
use crate::select::ChaosLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deadline imposed on every generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(15);

/// The two simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Fixed-cast adversarial interview: stress/confidence counters, answer
    /// assessment, round-robin panel selection.
    Gauntlet,
    /// Free-form group meeting: keyword-scored selection, no counter
    /// pressure, scorecard at the end.
    Roundtable,
}

/// Immutable per-session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub chaos: ChaosLevel,
    pub total_rounds: u32,
    pub generation_timeout: Duration,
}

impl SessionConfig {
    pub fn new(mode: SessionMode, chaos: ChaosLevel) -> Self {
        Self {
            mode,
            chaos,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_total_rounds(mut self, total_rounds: u32) -> Self {
        self.total_rounds = total_rounds;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }
}
