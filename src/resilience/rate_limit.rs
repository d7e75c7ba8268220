//! Per-endpoint sliding-window rate limiting.

use dashmap::DashMap;

/// Length of the trailing window in milliseconds.
pub const WINDOW_MS: u64 = 1_000;

/// Counts admitted requests per endpoint over the trailing second.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    windows: DashMap<String, Vec<u64>>,
    max_per_window: u32,
}

impl SlidingWindowLimiter {
    pub fn new(max_per_window: u32) -> Self {
        Self {
            windows: DashMap::new(),
            max_per_window,
        }
    }

    /// Admit a request for `key` at `now`, recording it on success.
    ///
    /// The entry lock is held across the check and the insert, so two callers
    /// cannot both take the last slot.
    pub fn try_acquire(&self, key: &str, now: u64) -> bool {
        let mut window = self.windows.entry(key.to_string()).or_default();
        window.retain(|&t| now.saturating_sub(t) < WINDOW_MS);

        if window.len() >= self.max_per_window as usize {
            return false;
        }
        window.push(now);
        true
    }

    /// Requests admitted for `key` in the window ending at `now`.
    pub fn recent_count(&self, key: &str, now: u64) -> usize {
        self.windows
            .get(key)
            .map(|w| w.iter().filter(|&&t| now.saturating_sub(t) < WINDOW_MS).count())
            .unwrap_or(0)
    }

    /// Drop timestamps older than `retention_ms` and forget idle endpoints.
    pub fn purge(&self, now: u64, retention_ms: u64) -> usize {
        let mut removed = 0;
        self.windows.retain(|_, window| {
            let before = window.len();
            window.retain(|&t| now.saturating_sub(t) <= retention_ms);
            removed += before - window.len();
            !window.is_empty()
        });
        removed
    }

    /// Number of endpoints currently tracked.
    pub fn tracked_endpoints(&self) -> usize {
        self.windows.len()
    }
}
