//! Time-bounded response cache for non-search pages.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::news::envelope::Page;

#[derive(Debug, Clone)]
struct CacheEntry {
    page: Page,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Key → page store. Entries are valid while `now - stored_at < ttl`.
///
/// Uses the tokio clock so paused-time tests control expiry.
#[derive(Clone)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fresh page for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Page> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => Some(entry.page.clone()),
            Some(_) => {
                entries.remove(key);
                tracing::debug!(key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store `page` under `key`, dropping every entry that has expired.
    pub fn insert(&self, key: String, page: Page) {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        let swept = before - entries.len();
        if swept > 0 {
            tracing::debug!(swept, "Dropped expired cache entries");
        }
        entries.insert(
            key,
            CacheEntry {
                page,
                stored_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
