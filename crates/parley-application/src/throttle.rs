//! Per-caller rate limiting with TTL eviction.
//!
//! An explicitly constructed, injectable fixed-window counter. Callers own
//! the store and pass it where it is needed — there is no module-level
//! state. Expired windows are swept inline on access, so the map stays
//! bounded by the set of callers active within one window.

use parley_core::{ParleyError, Result};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const DEFAULT_MAX_REQUESTS: u32 = 2;
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by caller identity.
pub struct TtlRateLimiter {
    max_requests: u32,
    window: Duration,
    entries: HashMap<String, WindowEntry>,
}

impl TtlRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: HashMap::new(),
        }
    }

    /// Records one request for `key`.
    ///
    /// # Errors
    ///
    /// [`ParleyError::RateLimited`] when the key has exhausted its window.
    pub fn check(&mut self, key: &str) -> Result<()> {
        let now = Instant::now();
        self.sweep(now);

        match self.entries.get_mut(key) {
            Some(entry) if now < entry.reset_at => {
                if entry.count >= self.max_requests {
                    let retry_after_secs =
                        entry.reset_at.saturating_duration_since(now).as_secs().max(1);
                    return Err(ParleyError::RateLimited { retry_after_secs });
                }
                entry.count += 1;
                Ok(())
            }
            _ => {
                self.entries.insert(
                    key.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Ok(())
            }
        }
    }

    /// Number of live windows, after eviction.
    pub fn active_keys(&mut self) -> usize {
        self.sweep(Instant::now());
        self.entries.len()
    }

    fn sweep(&mut self, now: Instant) {
        self.entries.retain(|_, entry| now < entry.reset_at);
    }
}

impl Default for TtlRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}
