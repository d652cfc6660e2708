//! Parley application layer.
//!
//! Composes the core engine with a caller-facing surface: a uuid-keyed
//! session registry, pre-mutation request validation, and TTL-based rate
//! limiting. Transport, rendering, and persistence stay with the caller.

pub mod dto;
pub mod service;
pub mod throttle;
pub mod validate;

pub use dto::{NewSessionParams, SessionSummary};
pub use service::SessionService;
pub use throttle::TtlRateLimiter;
