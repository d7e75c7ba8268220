//! Circuit breaker for endpoint protection.
//!
//! # States
//! - Closed: normal operation, failures are counted
//! - Open: endpoint assumed down, requests fail fast
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= threshold
//! Open → Closed: cooldown elapsed (counter reset)
//! Closed/Open → Closed: any success (counter reset)
//! Closed → Closed: no failure for one cooldown (counter dropped by the sweep)
//! ```
//!
//! # Design Decisions
//! - Per-endpoint circuit breaker (not global)
//! - Fail fast in Open state (no transport attempt)
//! - Cooldown expiry is checked on read and by the periodic sweep, so no
//!   timer task is needed per open circuit

use dashmap::DashMap;

/// Observable circuit state of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Default)]
struct FailureState {
    failures: u32,
    last_failure_at: u64,
    opened_at: Option<u64>,
}

/// Outcome of recording a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still closed, with the new failure count.
    Counted(u32),
    /// This failure opened the circuit.
    Opened,
    /// The circuit was already open.
    AlreadyOpen,
}

/// Failure counters and circuit status for every endpoint.
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    states: DashMap<String, FailureState>,
    failure_threshold: u32,
    cooldown_ms: u64,
}

impl CircuitBreakerRegistry {
    pub fn new(failure_threshold: u32, cooldown_ms: u64) -> Self {
        Self {
            states: DashMap::new(),
            failure_threshold,
            cooldown_ms,
        }
    }

    /// True if requests to `key` must be rejected at `now`.
    ///
    /// An open circuit whose cooldown has elapsed is closed here.
    pub fn is_open(&self, key: &str, now: u64) -> bool {
        self.state(key, now) == CircuitState::Open
    }

    pub fn state(&self, key: &str, now: u64) -> CircuitState {
        let expired = match self.states.get(key) {
            None => return CircuitState::Closed,
            Some(entry) => match entry.opened_at {
                None => return CircuitState::Closed,
                Some(opened_at) => now.saturating_sub(opened_at) >= self.cooldown_ms,
            },
        };

        if expired {
            self.close_if_expired(key, now);
            CircuitState::Closed
        } else {
            CircuitState::Open
        }
    }

    /// Recorded failures for `key` since the last reset.
    pub fn failure_count(&self, key: &str) -> u32 {
        self.states.get(key).map(|s| s.failures).unwrap_or(0)
    }

    pub fn record_failure(&self, key: &str, now: u64) -> FailureOutcome {
        let mut state = self.states.entry(key.to_string()).or_default();
        state.failures = state.failures.saturating_add(1);
        state.last_failure_at = now;

        if state.opened_at.is_some() {
            return FailureOutcome::AlreadyOpen;
        }
        if state.failures >= self.failure_threshold {
            state.opened_at = Some(now);
            FailureOutcome::Opened
        } else {
            FailureOutcome::Counted(state.failures)
        }
    }

    /// Reset `key` to closed with a zero counter.
    pub fn record_success(&self, key: &str) {
        self.states.remove(key);
    }

    /// Close every circuit whose cooldown has elapsed and forget closed
    /// counters with no failure for a full cooldown. Returns how many went.
    pub fn close_expired(&self, now: u64) -> usize {
        let before = self.states.len();
        self.states.retain(|_, state| match state.opened_at {
            Some(opened_at) => now.saturating_sub(opened_at) < self.cooldown_ms,
            None => now.saturating_sub(state.last_failure_at) < self.cooldown_ms,
        });
        before - self.states.len()
    }

    fn close_if_expired(&self, key: &str, now: u64) {
        self.states.remove_if(key, |_, state| {
            state
                .opened_at
                .is_some_and(|opened_at| now.saturating_sub(opened_at) >= self.cooldown_ms)
        });
    }
}
