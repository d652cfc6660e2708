//! Session orchestration.
//!
//! The session engine owns the numeric game state and the per-turn control
//! flow; the submodules hold the pieces it composes.

mod answer;
mod config;
mod engine;
mod ending;
mod state;

pub use answer::{AnswerAssessment, AnswerQuality, assess_answer};
pub use config::{SessionConfig, SessionMode};
pub use ending::{
    Ending, EndingCategory, REJECTION_CONFIDENCE_THRESHOLD, SUCCESS_CONFIDENCE_THRESHOLD,
    derive_ending,
};
pub use engine::{RespondentReply, SessionEngine, TurnResult};
pub use state::{
    DEFAULT_TOTAL_ROUNDS, INITIAL_CONFIDENCE, INITIAL_STRESS, SessionPhase, SessionState,
};
