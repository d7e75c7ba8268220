//! Time-bounded response cache keyed by endpoint.

use dashmap::DashMap;
use serde_json::Value;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    fetched_at: u64,
}

/// A thread-safe cache of decoded response payloads.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl_ms: u64,
}

impl ResponseCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms,
        }
    }

    /// Payload for `key` if it is younger than the TTL at `now`.
    ///
    /// Stale entries are ignored here and left for [`purge_expired`](Self::purge_expired).
    pub fn get(&self, key: &str, now: u64) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if now.saturating_sub(entry.fetched_at) < self.ttl_ms {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: &str, payload: Value, now: u64) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                fetched_at: now,
            },
        );
    }

    /// Remove every entry that is no longer servable. Returns how many went.
    pub fn purge_expired(&self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.fetched_at) < self.ttl_ms);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
