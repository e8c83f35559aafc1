//! Grouping of sorted events into day buckets.

use chrono::{DateTime, Local, NaiveDate};

use crate::config::CardConfig;
use crate::event::CalendarEvent;

/// Events starting on one local day.
#[derive(Debug, Clone)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub events: Vec<CalendarEvent>,
}

/// Options controlling how events are bucketed and limited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupOptions {
    /// Maximum number of events across all groups.
    pub events_limit: Option<usize>,
    /// Truncate the day that crosses the limit instead of keeping it whole.
    pub hard_limit: bool,
    /// Put events that started before today under today.
    pub start_from_today: bool,
}

impl GroupOptions {
    pub fn from_config(config: &CardConfig) -> Self {
        Self {
            events_limit: config.events_limit,
            hard_limit: config.hard_limit,
            start_from_today: config.start_from_today,
        }
    }
}

/// Buckets events (sorted by start) into contiguous day groups.
///
/// With a limit, the day on which the running total first exceeds it is the
/// last one kept: whole in soft mode, cut down so the total equals the limit
/// in hard mode. A day cut down to nothing is dropped.
pub fn group_by_day(
    events: &[CalendarEvent],
    options: &GroupOptions,
    now: &DateTime<Local>,
) -> Vec<DayGroup> {
    let today = now.date_naive();
    let mut groups: Vec<DayGroup> = Vec::new();

    for event in events {
        let mut day = event.start().date_naive();
        if options.start_from_today && day < today {
            day = today;
        }
        match groups.last_mut() {
            Some(group) if group.day == day => group.events.push(event.clone()),
            _ => groups.push(DayGroup {
                day,
                events: vec![event.clone()],
            }),
        }
    }

    match options.events_limit {
        Some(limit) => apply_limit(groups, limit, options.hard_limit),
        None => groups,
    }
}

fn apply_limit(groups: Vec<DayGroup>, limit: usize, hard: bool) -> Vec<DayGroup> {
    let mut total = 0;
    let mut kept = Vec::with_capacity(groups.len());

    for mut group in groups {
        total += group.events.len();
        if total <= limit {
            kept.push(group);
            continue;
        }
        if hard {
            let over = total - limit;
            let keep = group.events.len().saturating_sub(over);
            group.events.truncate(keep);
        }
        if !group.events.is_empty() {
            kept.push(group);
        }
        break;
    }

    kept
}
