//! Parley core: turn-based multi-persona simulation orchestration.
//!
//! This crate owns the hard part of the simulator — deciding who speaks,
//! keeping the bounded game state honest, classifying and cleaning generated
//! text, and summarizing finished sessions. It performs no I/O: text
//! generation enters through the [`generate::TextGenerator`] seam, and all
//! randomness is injected so sessions replay deterministically under a
//! fixed seed.

pub mod error;
pub mod event;
pub mod generate;
pub mod mood;
pub mod persona;
pub mod sanitize;
pub mod scorecard;
pub mod select;
pub mod session;
pub mod transcript;

// Re-export the common error type
pub use error::{ParleyError, Result};
