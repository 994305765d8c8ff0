//! Fixed-size time windows.
//!
//! A window is identified by its start instant: the timestamp floored to a
//! multiple of the window size. With the default size of one minute this is
//! the minute-floor used for both tier residency and archive partitioning.

use crate::record::Timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Start of a time window, in milliseconds since the Unix epoch.
pub type WindowStart = u64;

/// One minute, the default window size.
pub const MINUTE_MS: u64 = 60_000;

/// Window arithmetic for a fixed window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Windowing {
    size_ms: u64,
}

impl Windowing {
    /// `size_ms` must be non-zero; zero is clamped to 1ms.
    pub fn new(size_ms: u64) -> Self {
        Self {
            size_ms: size_ms.max(1),
        }
    }

    pub fn minutes() -> Self {
        Self::new(MINUTE_MS)
    }

    pub fn size_ms(&self) -> u64 {
        self.size_ms
    }

    /// The window containing `timestamp`.
    #[inline]
    pub fn window_of(&self, timestamp: Timestamp) -> WindowStart {
        timestamp - timestamp % self.size_ms
    }

    /// Start of the window `n` windows before `window`, saturating at zero.
    pub fn windows_before(&self, window: WindowStart, n: u64) -> WindowStart {
        window.saturating_sub(n.saturating_mul(self.size_ms))
    }

    /// Milliseconds from `now` until the next window boundary (never zero).
    pub fn until_next_boundary(&self, now: Timestamp) -> u64 {
        self.size_ms - now % self.size_ms
    }

    /// Human-readable label for a window, e.g. `2024-05-01T12:34`.
    pub fn label(&self, window: WindowStart) -> String {
        let formatted = i64::try_from(window)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| {
                if self.size_ms % MINUTE_MS == 0 {
                    dt.format("%Y-%m-%dT%H:%M").to_string()
                } else {
                    dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
                }
            });
        formatted.unwrap_or_else(|| format!("{window}ms"))
    }
}

impl Default for Windowing {
    fn default() -> Self {
        Self::minutes()
    }
}
