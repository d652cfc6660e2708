//! Caller-facing data shapes.
//!
//! Thin serde structs decoupled from the domain types, so transports can
//! evolve without touching the core.

use parley_core::select::ChaosLevel;
use parley_core::session::{SessionMode, SessionPhase, SessionState};
use serde::{Deserialize, Serialize};

/// Settings for a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionParams {
    pub mode: SessionMode,
    /// Intensity dial, 1-3
    pub chaos_dial: u32,
    /// Round budget; defaults to the standard session length
    #[serde(default)]
    pub total_rounds: Option<u32>,
    /// Fixed RNG seed for deterministic replay
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NewSessionParams {
    pub fn new(mode: SessionMode, chaos: ChaosLevel) -> Self {
        Self {
            mode,
            chaos_dial: chaos.dial(),
            total_rounds: None,
            seed: None,
        }
    }

    pub fn with_total_rounds(mut self, total_rounds: u32) -> Self {
        self.total_rounds = Some(total_rounds);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Registry view of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub mode: SessionMode,
    pub round: u32,
    pub total_rounds: u32,
    pub phase: SessionPhase,
}

impl SessionSummary {
    pub(crate) fn from_state(id: &str, mode: SessionMode, state: &SessionState) -> Self {
        Self {
            id: id.to_string(),
            mode,
            round: state.round,
            total_rounds: state.total_rounds,
            phase: state.phase,
        }
    }
}
