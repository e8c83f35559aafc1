//! One-shot agenda.

use std::sync::Arc;

use calcard_core::{CardConfig, GroupOptions, group_by_day};
use calcard_pipeline::{AgendaPipeline, AgendaSnapshot};
use chrono::{DateTime, Local};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::render;

/// Fetches every calendar once and prints the agenda.
pub async fn run(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let provider = super::build_provider(config)?;
    let pipeline = AgendaPipeline::new(Arc::new(provider));

    let now = Local::now();
    let outcome = pipeline.refresh(&config.card, now).await?;
    match outcome.snapshot() {
        Some(snapshot) => print_snapshot(snapshot, &config.card, json, &now),
        None => {
            debug!("No snapshot available");
            Ok(())
        }
    }
}

/// Groups a snapshot by day and prints it as text or JSON.
pub fn print_snapshot(
    snapshot: &AgendaSnapshot,
    card: &CardConfig,
    json: bool,
    now: &DateTime<Local>,
) -> ClientResult<()> {
    let groups = group_by_day(&snapshot.events, &GroupOptions::from_config(card), now);
    let output = if json {
        render::render_json(&groups, &snapshot.failed, card, now)?
    } else {
        render::render_text(&groups, &snapshot.failed, card, now)
    };
    println!("{}", output);
    Ok(())
}
