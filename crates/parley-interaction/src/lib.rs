//! Generation backends and prompt construction for Parley.
//!
//! Everything model-facing lives here: the system-prompt builder, an
//! OpenAI-compatible chat API client, a scripted generator for tests and
//! offline play, and secret/config loading.

pub mod api;
pub mod config;
pub mod prompt;
pub mod scripted;

pub use api::ChatApiGenerator;
pub use config::GeneratorConfig;
pub use prompt::{CastPrompter, Position, opening_request};
pub use scripted::ScriptedGenerator;
