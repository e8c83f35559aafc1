//! Periodic refresh with new-event notifications.

use std::sync::Arc;
use std::time::Duration;

use calcard_pipeline::{AgendaPipeline, Notifier, RefreshOutcome};
use chrono::Local;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::agenda::print_snapshot;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Refreshes the agenda on a fixed period until interrupted.
///
/// The agenda is printed whenever calendars were actually fetched; ticks
/// served from the cache only log.
pub async fn run(config: &ClientConfig, interval: Option<u64>, json: bool) -> ClientResult<()> {
    let provider = Arc::new(super::build_provider(config)?);
    let notifier = Notifier::new(provider.client().clone());
    let pipeline = AgendaPipeline::new(provider);

    let period = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.card.refresh_interval())
        .max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_secs = period.as_secs(), "Watching calendars");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                return Ok(());
            }
        }

        let now = Local::now();
        match pipeline.refresh(&config.card, now).await? {
            RefreshOutcome::Fetched { snapshot, previous } => {
                let sent = notifier
                    .notify_new_events(&config.card, previous.as_deref(), &snapshot)
                    .await;
                debug!(sent, "Notifications dispatched");
                print_snapshot(&snapshot, &config.card, json, &now)?;
            }
            RefreshOutcome::Cached(snapshot) => {
                debug!(fetched_at = %snapshot.fetched_at, "Snapshot still fresh");
            }
            RefreshOutcome::Busy => debug!("Previous refresh still running"),
        }
    }
}
