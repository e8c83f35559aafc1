//! The aggregation pipeline.
//!
//! [`AgendaPipeline::refresh`] fetches every configured calendar
//! concurrently, merges the results, normalizes them and caches the snapshot.
//! A calendar that fails to fetch is recorded in the snapshot and the others
//! still show.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use calcard_core::{CalendarEntity, CalendarEvent, CardConfig, EventRules, FetchWindow, RawEvent};
use calcard_providers::{CalendarApi, ProviderError, ProviderResult, normalize_events};
use chrono::{DateTime, Local};
use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::cache::{AgendaCache, CacheKey};
use crate::error::PipelineResult;

/// A calendar that could not be fetched.
#[derive(Debug)]
pub struct FailureRecord {
    /// Display name of the calendar (configured name, else entity id).
    pub name: String,
    pub error: ProviderError,
}

impl FailureRecord {
    /// Returns true if the calendar should load again on a later refresh.
    pub fn is_transient(&self) -> bool {
        self.error.is_transient()
    }
}

/// The result of one fetch cycle.
#[derive(Debug)]
pub struct AgendaSnapshot {
    /// Normalized events, sorted by start.
    pub events: Vec<CalendarEvent>,
    pub failed: Vec<FailureRecord>,
    pub fetched_at: DateTime<Local>,
}

impl AgendaSnapshot {
    /// Returns true if the event id is part of this snapshot.
    pub fn contains(&self, id: &str) -> bool {
        self.events.iter().any(|e| e.id() == id)
    }
}

/// What a refresh did.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Calendars were fetched. `previous` is the snapshot this one replaced.
    Fetched {
        snapshot: Arc<AgendaSnapshot>,
        previous: Option<Arc<AgendaSnapshot>>,
    },
    /// The cached snapshot was still fresh.
    Cached(Arc<AgendaSnapshot>),
    /// Another refresh is in flight; nothing was done.
    Busy,
}

impl RefreshOutcome {
    /// Returns the snapshot to display, if any.
    pub fn snapshot(&self) -> Option<&Arc<AgendaSnapshot>> {
        match self {
            Self::Fetched { snapshot, .. } | Self::Cached(snapshot) => Some(snapshot),
            Self::Busy => None,
        }
    }
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fetch, normalize and cache state for one agenda.
pub struct AgendaPipeline {
    api: Arc<dyn CalendarApi>,
    cache: Mutex<AgendaCache>,
    busy: AtomicBool,
}

impl AgendaPipeline {
    pub fn new(api: Arc<dyn CalendarApi>) -> Self {
        Self {
            api,
            cache: Mutex::new(AgendaCache::new()),
            busy: AtomicBool::new(false),
        }
    }

    /// Returns true while a refresh is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Forces the next refresh to fetch.
    pub async fn invalidate(&self) {
        self.cache.lock().await.invalidate();
    }

    /// Returns the last snapshot, fresh or not.
    pub async fn latest(&self) -> Option<Arc<AgendaSnapshot>> {
        self.cache.lock().await.latest()
    }

    /// Brings the agenda up to date at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`](crate::PipelineError::Config) if the
    /// configuration is invalid. Calendar fetch failures are not errors.
    pub async fn refresh(&self, config: &CardConfig, now: DateTime<Local>) -> PipelineResult<RefreshOutcome> {
        config.validate()?;
        let rules = EventRules::from_config(config)?;

        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            debug!("Refresh already in progress");
            return Ok(RefreshOutcome::Busy);
        };

        let key = CacheKey::from_config(config);
        if let Some(snapshot) = self
            .cache
            .lock()
            .await
            .get_fresh(&key, &now, config.refresh_interval())
        {
            return Ok(RefreshOutcome::Cached(snapshot));
        }

        let window = FetchWindow::for_days(&now, config.number_of_days);
        let (raw_events, failed) = self.fetch_all(&config.entities, &window).await;
        let events = normalize_events(raw_events, config, &rules, &now);

        info!(
            events = events.len(),
            failed = failed.len(),
            "Agenda refreshed"
        );

        let snapshot = Arc::new(AgendaSnapshot {
            events,
            failed,
            fetched_at: now,
        });
        let previous = self.cache.lock().await.insert(key, Arc::clone(&snapshot));

        Ok(RefreshOutcome::Fetched { snapshot, previous })
    }

    /// Fetches every entity concurrently and waits for all of them.
    async fn fetch_all(
        &self,
        entities: &[CalendarEntity],
        window: &FetchWindow,
    ) -> (Vec<RawEvent>, Vec<FailureRecord>) {
        let fetches = entities.iter().map(|entity| async move {
            let result: ProviderResult<Vec<RawEvent>> =
                self.api.fetch_events(&entity.entity, window).await;
            (entity, result)
        });

        let mut raw_events = Vec::new();
        let mut failed = Vec::new();
        for (entity, result) in join_all(fetches).await {
            match result {
                Ok(events) => raw_events.extend(events),
                Err(error) => {
                    let error = error.for_entity(&entity.entity);
                    if error.is_transient() {
                        warn!(entity = %entity.entity, error = %error, "Calendar unavailable, will retry on next refresh");
                    } else {
                        error!(entity = %entity.entity, error = %error, "Calendar cannot be loaded, check the configuration");
                    }
                    failed.push(FailureRecord {
                        name: entity.display_name().to_string(),
                        error,
                    });
                }
            }
        }

        (raw_events, failed)
    }
}
