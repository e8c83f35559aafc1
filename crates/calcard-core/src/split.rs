//! Splitting of multi-day events into per-day fragments.

use chrono::{DateTime, Local};

use crate::event::CalendarEvent;

/// Splits a multi-day event into one fragment per day of its [`span_days`](CalendarEvent::span_days).
///
/// Fragments starting at or after `window_end` are dropped. Events that are
/// not multi-day, or whose span is a single day, are returned unchanged.
pub fn split_multi_day(event: &CalendarEvent, window_end: &DateTime<Local>) -> Vec<CalendarEvent> {
    let days_long = event.span_days();
    if !event.is_multi_day() || days_long < 2 {
        return vec![event.clone()];
    }

    (0..days_long)
        .map(|add_days| event.fragment(add_days, days_long))
        .filter(|fragment| fragment.start() < *window_end)
        .collect()
}
