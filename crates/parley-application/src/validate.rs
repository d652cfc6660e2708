//! Pre-mutation input validation.
//!
//! Every check here runs before any session state is touched; a rejected
//! request leaves the engine exactly as it was.

use parley_core::select::ChaosLevel;
use parley_core::session::SessionMode;
use parley_core::{ParleyError, Result};

/// Longest accepted participant message, in chars.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Substrings rejected outright; messages are user-supplied and may be
/// rendered by arbitrary frontends.
const BLOCKED_SUBSTRINGS: &[&str] = &[
    "<script>",
    "javascript:",
    "onerror=",
    "onload=",
    "eval(",
    "document.cookie",
];

/// Gauntlet panels: 2-4 interviewers.
const GAUNTLET_ROSTER: (usize, usize) = (2, 4);
/// Roundtables: 2-6 attendees.
const ROUNDTABLE_ROSTER: (usize, usize) = (2, 6);

/// Validates one participant message.
pub fn validate_message(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(ParleyError::validation("message", "must not be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ParleyError::validation(
            "message",
            format!("must not exceed {MAX_MESSAGE_CHARS} characters"),
        ));
    }
    let lowered = message.to_lowercase();
    for blocked in BLOCKED_SUBSTRINGS {
        if lowered.contains(blocked) {
            return Err(ParleyError::validation("message", "contains unsafe content"));
        }
    }
    Ok(())
}

/// Validates the roster size for the session mode.
pub fn validate_roster_size(mode: SessionMode, size: usize) -> Result<()> {
    let (min, max) = match mode {
        SessionMode::Gauntlet => GAUNTLET_ROSTER,
        SessionMode::Roundtable => ROUNDTABLE_ROSTER,
    };
    if size < min || size > max {
        return Err(ParleyError::validation(
            "roster",
            format!("needs {min}-{max} personas, got {size}"),
        ));
    }
    Ok(())
}

/// Maps a numeric chaos dial to its level.
pub fn validate_chaos_dial(dial: u32) -> Result<ChaosLevel> {
    ChaosLevel::try_from_dial(dial)
        .ok_or_else(|| ParleyError::validation("chaos", format!("dial must be 1-3, got {dial}")))
}
