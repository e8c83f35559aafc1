//! Agenda output: plain text for terminals, JSON for scripts.

use calcard_core::{
    CalendarEvent, CardConfig, DayGroup, event_time_text, map_url, progress_percent,
};
use calcard_pipeline::FailureRecord;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

const NO_EVENTS_TEXT: &str = "No upcoming events";
const PROGRESS_WIDTH: usize = 10;

/// Renders grouped days as text, one header per day and one line per event.
pub fn render_text(
    groups: &[DayGroup],
    failed: &[FailureRecord],
    config: &CardConfig,
    now: &DateTime<Local>,
) -> String {
    let mut lines = Vec::new();

    if let Some(title) = config.title.as_deref().filter(|t| !t.is_empty()) {
        lines.push(title.to_string());
    }

    if groups.is_empty() {
        lines.push(NO_EVENTS_TEXT.to_string());
    }

    for group in groups {
        lines.push(group.day.format(&config.date_format).to_string());
        for event in &group.events {
            lines.push(event_line(event, config));
            if let Some(percent) = progress_percent(event, now).filter(|_| config.progress_bar) {
                lines.push(format!("  {}", progress_bar(percent)));
            }
        }
    }

    for failure in failed {
        let retry = if failure.is_transient() { " (will retry)" } else { "" };
        lines.push(format!("Failed to load {}: {}{}", failure.name, failure.error, retry));
    }

    lines.join("\n")
}

fn event_line(event: &CalendarEvent, config: &CardConfig) -> String {
    let mut line = if config.hide_time {
        format!("  {}", event.title())
    } else {
        format!(
            "  {}  {}",
            event_time_text(event, config, &config.time_format),
            event.title()
        )
    };

    if config.show_location && !event.location().is_empty() {
        line.push_str(" @ ");
        line.push_str(event.location());
    }
    if let Some(origin) = event.origin().filter(|_| config.show_event_origin) {
        line.push_str(&format!(" [{}]", origin.display_name()));
    }
    line
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0 * PROGRESS_WIDTH as f64) as usize).min(PROGRESS_WIDTH);
    format!(
        "[{}{}] {:.0}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        percent
    )
}

/// JSON output for machine consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAgenda {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub days: Vec<JsonDay>,
    /// Calendars that could not be fetched.
    pub failed: Vec<JsonFailure>,
    /// Number of events across all days.
    pub count: usize,
}

/// One day of the agenda.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDay {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    /// Header formatted with `dateFormat`.
    pub label: String,
    pub events: Vec<JsonEvent>,
}

/// A single event in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEvent {
    pub id: String,
    pub title: String,
    /// Start time in RFC 3339 format.
    pub start: String,
    /// End time in RFC 3339 format.
    pub end: String,
    /// Formatted time string for display.
    pub time_text: String,
    pub is_all_day: bool,
    pub is_multi_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    /// Display name of the source calendar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Percent elapsed for a running event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonFailure {
    pub name: String,
    pub code: String,
    pub message: String,
    pub transient: bool,
}

impl JsonAgenda {
    pub fn build(
        groups: &[DayGroup],
        failed: &[FailureRecord],
        config: &CardConfig,
        now: &DateTime<Local>,
    ) -> Self {
        let days: Vec<JsonDay> = groups
            .iter()
            .map(|group| JsonDay {
                date: group.day.format("%Y-%m-%d").to_string(),
                label: group.day.format(&config.date_format).to_string(),
                events: group
                    .events
                    .iter()
                    .map(|event| JsonEvent::build(event, config, now))
                    .collect(),
            })
            .collect();

        Self {
            title: config.title.clone(),
            count: days.iter().map(|d| d.events.len()).sum(),
            days,
            failed: failed
                .iter()
                .map(|f| JsonFailure {
                    name: f.name.clone(),
                    code: f.error.code().as_str().to_string(),
                    message: f.error.message().to_string(),
                    transient: f.is_transient(),
                })
                .collect(),
        }
    }
}

impl JsonEvent {
    fn build(event: &CalendarEvent, config: &CardConfig, now: &DateTime<Local>) -> Self {
        let location = Some(event.location())
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        Self {
            id: event.id().to_string(),
            title: event.title().to_string(),
            start: event.start().to_rfc3339(),
            end: event.end().to_rfc3339(),
            time_text: event_time_text(event, config, &config.time_format),
            is_all_day: event.is_all_day(),
            is_multi_day: event.is_multi_day(),
            location,
            map_url: map_url(event),
            origin: event.origin().map(|o| o.display_name().to_string()),
            progress: progress_percent(event, now),
            html_link: event.html_link().map(str::to_string),
        }
    }
}

/// Renders grouped days as pretty-printed JSON.
pub fn render_json(
    groups: &[DayGroup],
    failed: &[FailureRecord],
    config: &CardConfig,
    now: &DateTime<Local>,
) -> ClientResult<String> {
    let agenda = JsonAgenda::build(groups, failed, config, now);
    serde_json::to_string_pretty(&agenda).map_err(|e| ClientError::Render(e.to_string()))
}
