//! Bounded response cache with per-entry TTL
//!
//! Keys are normalized message text (trimmed, lowercased, whitespace
//! collapsed), so trivially different spellings of the same message share an
//! entry.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

const MAX_CAPACITY: usize = 10_000;
const MAX_KEY_LEN: usize = 10_000;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    inserted: Instant,
}

pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Capacity is clamped to `1..=10000`
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.clamp(1, MAX_CAPACITY);
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn normalize_key(text: &str) -> String {
        text.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn get(&self, text: &str) -> Option<String> {
        let key = Self::normalize_key(text);
        if key.len() > MAX_KEY_LEN {
            return None;
        }

        let mut entries = self.entries.lock();
        let expired = match entries.get(&key) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(&key);
        }
        None
    }

    pub fn insert(&self, text: &str, value: impl Into<String>) {
        let key = Self::normalize_key(text);
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            tracing::debug!("Cache key empty or too long, skipping");
            return;
        }

        self.entries.lock().put(
            key,
            CacheEntry {
                value: value.into(),
                inserted: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
