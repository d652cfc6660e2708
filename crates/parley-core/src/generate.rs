//! The text-generation seam.
//!
//! The core never talks to a model directly; it consumes the `TextGenerator`
//! trait defined here. Concrete backends (HTTP chat APIs, scripted replies
//! for tests) live in `parley-interaction` — the trait is forward-declared
//! here to avoid a circular dependency.

use crate::persona::{Persona, Roster};
use crate::select::ChaosLevel;
use crate::session::SessionMode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a chat message handed to a generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Failure modes of a generation backend.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum GenerationError {
    /// The backend did not answer within the caller-imposed deadline.
    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    /// Transport-level failure (connection, TLS, DNS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered but the payload was unusable.
    #[error("Malformed backend response: {0}")]
    InvalidResponse(String),

    /// The backend has no reply to give (scripted generators only).
    #[error("Generator exhausted")]
    Exhausted,
}

/// Abstract text-generation capability.
///
/// Invoked once per selected persona per turn. Implementations must be
/// cancel-safe: the engine wraps every call in a timeout and treats expiry
/// as a [`GenerationError::Timeout`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produces one utterance for the persona described by `system_prompt`,
    /// conditioned on `messages` (prior turns plus same-turn context).
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> std::result::Result<String, GenerationError>;
}

/// Everything a prompt builder may condition a system prompt on.
pub struct PromptContext<'a> {
    pub mode: SessionMode,
    pub chaos: ChaosLevel,
    pub round: u32,
    pub total_rounds: u32,
    pub stress: i32,
    pub roster: &'a Roster,
}

/// Builds the per-persona system prompt for one generation call.
///
/// Prompt content lives outside the core (it is model-facing text, not
/// orchestration); the engine only needs this seam.
pub trait PersonaPrompter: Send + Sync {
    fn system_prompt(&self, persona: &Persona, ctx: &PromptContext<'_>) -> String;
}
