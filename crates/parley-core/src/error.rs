//! Error types for the Parley simulation core.

use crate::generate::GenerationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Parley libraries.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ParleyError {
    /// Input rejected before any state mutation
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The text generation backend failed
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Every selected persona failed to generate this turn.
    ///
    /// Recoverable: the answer-quality delta stays applied, the round does
    /// not advance, and the caller may retry the turn.
    #[error("No persona produced a response this turn")]
    NoRespondents,

    /// Session lookup failed
    #[error("Session not found: '{0}'")]
    SessionNotFound(String),

    /// Caller exceeded the request budget
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Creates a Validation error
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error leaves the session in a retryable state.
    ///
    /// Returns true for `NoRespondents` and `RateLimited`: the caller may
    /// repeat the same request without corrupting session state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoRespondents | Self::RateLimited { .. })
    }
}

/// A type alias for `Result<T, ParleyError>`.
pub type Result<T> = std::result::Result<T, ParleyError>;
