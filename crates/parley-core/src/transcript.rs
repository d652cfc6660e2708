//! Conversation transcript types.
//!
//! A transcript is the append-only record of one session. Insertion order is
//! the conversation order and the only ordering guarantee.

use crate::mood::Mood;
use crate::persona::PersonaRole;
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The human participant.
    User,
    /// One of the session's personas.
    Persona(PersonaRole),
}

/// A single utterance in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke
    pub speaker: Speaker,
    /// Sanitized utterance text
    pub text: String,
    /// Classified mood, persona turns only
    #[serde(default)]
    pub mood: Option<Mood>,
    /// Timestamp when the turn was recorded (ISO 8601 format)
    pub timestamp: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            mood: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn persona(role: PersonaRole, text: impl Into<String>, mood: Mood) -> Self {
        Self {
            speaker: Speaker::Persona(role),
            text: text.into(),
            mood: Some(mood),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only ordered sequence of turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent `n` turns, oldest first.
    pub fn tail(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}
