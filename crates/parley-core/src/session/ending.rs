//! Terminal narrative classification.
//!
//! An ending is derived purely from final session state, never stored
//! independently of it.

use super::state::{SessionPhase, SessionState};
use serde::{Deserialize, Serialize};

/// Confidence at or above this on completion is a success.
pub const SUCCESS_CONFIDENCE_THRESHOLD: i32 = 70;
/// Confidence below this on completion is a rejection; between the two
/// thresholds the outcome stays ambiguous.
pub const REJECTION_CONFIDENCE_THRESHOLD: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingCategory {
    Collapse,
    Success,
    Ambiguous,
    Rejection,
    Abandoned,
}

/// The terminal narrative handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ending {
    pub title: String,
    pub description: String,
    pub category: EndingCategory,
}

impl Ending {
    fn new(title: &str, description: &str, category: EndingCategory) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            category,
        }
    }
}

/// Derives the ending for a finished session.
///
/// # Panics
///
/// Panics if the session is still in progress — requesting an ending before
/// termination is a caller bug.
pub fn derive_ending(state: &SessionState) -> Ending {
    match state.phase {
        SessionPhase::InProgress => {
            panic!("ending requested for a session still in progress")
        }
        SessionPhase::Collapsed => Ending::new(
            "Broken by the Panel",
            "The barrage finally landed and you cracked. Prepare better next time.",
            EndingCategory::Collapse,
        ),
        SessionPhase::Completed => {
            if state.confidence >= SUCCESS_CONFIDENCE_THRESHOLD {
                Ending::new(
                    "Offer Extended",
                    "You survived the gauntlet! The offer is 30% below market, though. \
                     \"We weigh growth potential heavily here.\"",
                    EndingCategory::Success,
                )
            } else if state.confidence >= REJECTION_CONFIDENCE_THRESHOLD {
                Ending::new(
                    "We'll Be in Touch",
                    "\"We'll evaluate holistically and get back to you within a week.\" \
                     (They will not.)",
                    EndingCategory::Ambiguous,
                )
            } else {
                Ending::new(
                    "Thanks for Coming In",
                    "\"Your profile doesn't quite match our current needs. Best of luck.\"",
                    EndingCategory::Rejection,
                )
            }
        }
        SessionPhase::Abandoned => Ending::new(
            "Walked Out",
            "You ended it early. Bold — but the opportunity went with you.",
            EndingCategory::Abandoned,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::DEFAULT_TOTAL_ROUNDS;

    fn state_with(phase: SessionPhase, confidence: i32) -> SessionState {
        let mut s = SessionState::new(DEFAULT_TOTAL_ROUNDS);
        s.phase = phase;
        s.confidence = confidence;
        s
    }

    #[test]
    fn collapse_outranks_confidence() {
        let ending = derive_ending(&state_with(SessionPhase::Collapsed, 95));
        assert_eq!(ending.category, EndingCategory::Collapse);
    }

    #[test]
    fn completion_splits_on_confidence_bands() {
        let cases = [
            (100, EndingCategory::Success),
            (70, EndingCategory::Success),
            (69, EndingCategory::Ambiguous),
            (40, EndingCategory::Ambiguous),
            (39, EndingCategory::Rejection),
            (0, EndingCategory::Rejection),
        ];
        for (confidence, expected) in cases {
            let ending = derive_ending(&state_with(SessionPhase::Completed, confidence));
            assert_eq!(ending.category, expected, "confidence {confidence}");
        }
    }

    #[test]
    fn abandonment_ignores_counters() {
        let ending = derive_ending(&state_with(SessionPhase::Abandoned, 100));
        assert_eq!(ending.category, EndingCategory::Abandoned);
    }

    #[test]
    #[should_panic(expected = "still in progress")]
    fn in_progress_sessions_have_no_ending() {
        derive_ending(&state_with(SessionPhase::InProgress, 50));
    }
}
