//! Scripted generation backend.
//!
//! Serves canned replies in order — the deterministic stand-in used by
//! tests and by the CLI's offline mode.

use async_trait::async_trait;
use parley_core::generate::{ChatMessage, GenerationError, TextGenerator};
use tokio::sync::Mutex;

enum Exhaustion {
    /// Keep cycling through the bank forever.
    Cycle,
    /// Fail with [`GenerationError::Exhausted`] once the bank runs out.
    Fail,
}

/// Pops replies from a fixed bank.
pub struct ScriptedGenerator {
    lines: Vec<String>,
    cursor: Mutex<usize>,
    exhaustion: Exhaustion,
}

impl ScriptedGenerator {
    /// A generator that cycles through `lines` forever. Panics on an empty
    /// bank — a scripted session with nothing to say is a test bug.
    pub fn cycling<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        assert!(!lines.is_empty(), "scripted generator needs at least one line");
        Self {
            lines,
            cursor: Mutex::new(0),
            exhaustion: Exhaustion::Cycle,
        }
    }

    /// A generator that errors once `lines` are used up.
    pub fn finite<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            cursor: Mutex::new(0),
            exhaustion: Exhaustion::Fail,
        }
    }

    /// The default offline interview bank.
    pub fn offline_bank() -> Self {
        Self::cycling([
            "Walk me through the hardest bug you ever shipped to production.",
            "Are you sure that was the right call? Elaborate.",
            "Your resume says senior. Convince me.",
            "Why did you leave your last position?",
            "Hold on — what would you do if the requirements changed tomorrow?",
            "Interesting... tell me more about the trade-offs.",
            "That sounds rehearsed. Give me a real example.",
        ])
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _messages: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        let mut cursor = self.cursor.lock().await;
        match self.exhaustion {
            Exhaustion::Cycle => {
                let line = self.lines[*cursor % self.lines.len()].clone();
                *cursor += 1;
                Ok(line)
            }
            Exhaustion::Fail => {
                if *cursor >= self.lines.len() {
                    return Err(GenerationError::Exhausted);
                }
                let line = self.lines[*cursor].clone();
                *cursor += 1;
                Ok(line)
            }
        }
    }
}
