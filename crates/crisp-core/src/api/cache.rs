//! Short-TTL in-memory response cache for idempotent GETs.
//!
//! Keyed by full request path (query string included). Only allow-listed
//! endpoint prefixes are cached; fast-moving resources (indicators,
//! notifications) always hit the network.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Endpoint prefixes considered stable enough to cache.
const DEFAULT_ALLOWED_PREFIXES: &[&str] = &[
    "/api/users/",
    "/api/organizations/",
    "/api/trust-relationships/",
];

struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

pub struct ResponseCache {
    ttl: Duration,
    allowed_prefixes: Vec<String>,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            allowed_prefixes: DEFAULT_ALLOWED_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_string())
                .collect(),
            entries: HashMap::new(),
        }
    }

    /// Whether responses for this path may be cached at all.
    #[must_use]
    pub fn is_cacheable(&self, path: &str) -> bool {
        self.allowed_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Fresh cached value for a path, if any.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.get_at(path, Instant::now())
    }

    pub fn insert(&mut self, path: &str, value: Value) {
        self.insert_at(path, value, Instant::now());
    }

    /// Drop every entry whose path starts with the given prefix.
    pub fn invalidate_prefix(&mut self, prefix: &str) {
        self.entries.retain(|path, _| !path.starts_with(prefix));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // Instant-taking variants so tests can pin the clock.

    pub(crate) fn get_at(&self, path: &str, now: Instant) -> Option<Value> {
        let entry = self.entries.get(path)?;
        if now.duration_since(entry.stored_at) < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub(crate) fn insert_at(&mut self, path: &str, value: Value, stored_at: Instant) {
        if self.is_cacheable(path) {
            self.entries.insert(path.to_string(), CacheEntry { value, stored_at });
        }
    }
}
