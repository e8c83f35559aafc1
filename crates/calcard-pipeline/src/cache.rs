//! Snapshot cache with a time-based refresh policy.
//!
//! One [`AgendaCache`] belongs to one pipeline. It holds the last snapshot
//! together with the key it was fetched for; a snapshot is reused only for the
//! same key and while younger than the refresh interval.

use std::sync::Arc;
use std::time::Duration;

use calcard_core::CardConfig;
use chrono::{DateTime, Local};
use tracing::{debug, trace};

use crate::pipeline::AgendaSnapshot;

/// What a snapshot was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    entities: Vec<String>,
    number_of_days: u32,
}

impl CacheKey {
    pub fn from_config(config: &CardConfig) -> Self {
        Self {
            entities: config.entities.iter().map(|e| e.entity.clone()).collect(),
            number_of_days: config.number_of_days,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    key: CacheKey,
    snapshot: Arc<AgendaSnapshot>,
    stale: bool,
}

impl CacheEntry {
    fn is_fresh(&self, key: &CacheKey, now: &DateTime<Local>, interval: Duration) -> bool {
        if self.stale || self.key != *key {
            return false;
        }
        (*now - self.snapshot.fetched_at)
            .to_std()
            .is_ok_and(|elapsed| elapsed < interval)
    }
}

/// Cache of the last fetched agenda.
#[derive(Debug, Default)]
pub struct AgendaCache {
    entry: Option<CacheEntry>,
}

impl AgendaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot if it can be reused at `now`.
    pub fn get_fresh(
        &self,
        key: &CacheKey,
        now: &DateTime<Local>,
        interval: Duration,
    ) -> Option<Arc<AgendaSnapshot>> {
        let entry = self.entry.as_ref()?;
        if entry.is_fresh(key, now, interval) {
            trace!(fetched_at = %entry.snapshot.fetched_at, "Cache hit");
            Some(Arc::clone(&entry.snapshot))
        } else {
            None
        }
    }

    /// Returns the last snapshot, fresh or not.
    pub fn latest(&self) -> Option<Arc<AgendaSnapshot>> {
        self.entry.as_ref().map(|e| Arc::clone(&e.snapshot))
    }

    /// Stores a new snapshot, returning the one it replaces.
    pub fn insert(&mut self, key: CacheKey, snapshot: Arc<AgendaSnapshot>) -> Option<Arc<AgendaSnapshot>> {
        debug!(events = snapshot.events.len(), failed = snapshot.failed.len(), "Caching snapshot");
        self.entry
            .replace(CacheEntry {
                key,
                snapshot,
                stale: false,
            })
            .map(|e| e.snapshot)
    }

    /// Forces the next lookup to miss. The last snapshot stays available
    /// through [`Self::latest`].
    pub fn invalidate(&mut self) {
        if let Some(entry) = self.entry.as_mut() {
            entry.stale = true;
            debug!("Invalidated cached snapshot");
        }
    }
}
