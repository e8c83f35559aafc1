//! The normalized calendar event.
//!
//! A [`CalendarEvent`] wraps one [`RawEvent`] and derives everything the
//! agenda needs from it up front: resolved local start and end, all-day and
//! multi-day classification, display title and the composite id. Fragments of
//! a multi-day event share the raw payload and carry their position in the
//! span as a [`Fragment`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Local};

use crate::config::{CalendarEntity, EventRules};
use crate::error::EventError;
use crate::raw_event::RawEvent;
use crate::time::{self, is_midnight};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Position of a fragment within a multi-day event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Days after the event's first day (0-based).
    pub add_days: u32,
    /// Total number of days the event occupies.
    pub days_long: u32,
}

impl Fragment {
    /// Returns true for the first day of the span.
    pub fn is_first(&self) -> bool {
        self.add_days == 0
    }

    /// Returns true for the last day of the span.
    pub fn is_last(&self) -> bool {
        self.add_days + 1 == self.days_long
    }
}

/// A calendar event ready for filtering, grouping and display.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    raw: Arc<RawEvent>,
    id: String,
    base_title: String,
    title: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    is_all_day: bool,
    is_multi_day: bool,
    fragment: Option<Fragment>,
    origin: Option<CalendarEntity>,
}

impl CalendarEvent {
    /// Adapts a raw payload.
    ///
    /// A missing `end` resolves to the start instant, and an end before the
    /// start is clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MissingStart`] if the payload has no start.
    pub fn new(raw: impl Into<Arc<RawEvent>>, rules: &EventRules) -> Result<Self, EventError> {
        let raw = raw.into();
        let start = raw
            .start
            .as_ref()
            .ok_or_else(|| EventError::missing_start(raw.key().unwrap_or(raw.base_title())))?
            .to_local();
        let end = raw
            .end
            .as_ref()
            .map_or(start, |end| end.to_local())
            .max(start);
        let base_title = rules.clean_title(raw.base_title());

        Ok(Self::build(raw, base_title, start, end, None))
    }

    fn build(
        raw: Arc<RawEvent>,
        base_title: String,
        start: DateTime<Local>,
        end: DateTime<Local>,
        fragment: Option<Fragment>,
    ) -> Self {
        let title = match fragment {
            Some(f) => format!("{base_title} ({}/{})", f.add_days + 1, f.days_long),
            None => base_title.clone(),
        };
        let id = format!("{}{}", raw.key().unwrap_or_default(), title);
        let is_all_day = match fragment {
            None => is_midnight(&start) && is_midnight(&end),
            Some(f) if f.is_first() => is_midnight(&start),
            Some(f) if f.is_last() => is_midnight(&end),
            Some(_) => true,
        };

        Self {
            raw,
            id,
            base_title,
            title,
            start,
            end,
            is_all_day,
            is_multi_day: spans_several_days(&start, &end),
            fragment,
            origin: None,
        }
    }

    /// Returns the fragment for day `add_days` of a `days_long` span.
    ///
    /// A fragment starts at the event's start shifted by `add_days` days,
    /// except the last one, which starts at local midnight of its day. It ends
    /// at 23:59:59.999 of its own start day, except the last one, which keeps
    /// the real end. Multi-day classification is that of the whole event.
    pub fn fragment(&self, add_days: u32, days_long: u32) -> Self {
        let fragment = Fragment {
            add_days,
            days_long,
        };
        let day = time::add_days(self.start.date_naive(), add_days);
        let start = if fragment.is_last() {
            time::start_of_day(day)
        } else {
            time::resolve_local(day.and_time(self.start.time()))
        };
        let end = if fragment.is_last() {
            self.end
        } else {
            time::end_of_day(day)
        };

        let mut event = Self::build(
            Arc::clone(&self.raw),
            self.base_title.clone(),
            start,
            end,
            Some(fragment),
        );
        event.is_multi_day = self.is_multi_day;
        event.origin = self.origin.clone();
        event
    }

    /// Builder method to tag the calendar the event came from.
    pub fn with_origin(mut self, origin: Option<CalendarEntity>) -> Self {
        self.origin = origin;
        self
    }

    /// Number of days the event occupies, counted in whole 24 hour periods.
    ///
    /// One minute is taken off the duration first, so an end at exactly
    /// midnight does not open an extra day. Never less than 1.
    pub fn span_days(&self) -> u32 {
        let minutes = (self.end - self.start - Duration::minutes(1)).num_minutes();
        let whole_days = minutes.div_euclid(MINUTES_PER_DAY).max(0);
        u32::try_from(whole_days).unwrap_or(u32::MAX - 1) + 1
    }

    /// Composite id: backend key followed by the display title.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display title, including the ` (n/total)` suffix on fragments.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> DateTime<Local> {
        self.start
    }

    pub fn end(&self) -> DateTime<Local> {
        self.end
    }

    pub fn is_all_day(&self) -> bool {
        self.is_all_day
    }

    pub fn is_multi_day(&self) -> bool {
        self.is_multi_day
    }

    pub fn fragment_info(&self) -> Option<Fragment> {
        self.fragment
    }

    pub fn is_first_day(&self) -> bool {
        self.fragment.is_some_and(|f| f.is_first())
    }

    pub fn is_last_day(&self) -> bool {
        self.fragment.is_some_and(|f| f.is_last())
    }

    /// The place: text before the first comma of the location.
    pub fn location(&self) -> &str {
        self.raw
            .location
            .as_deref()
            .map(|loc| loc.split(',').next().unwrap_or_default().trim())
            .unwrap_or_default()
    }

    /// The address: text after the first comma (or the whole location when
    /// there is none), with spaces replaced by `+` for map links.
    pub fn location_address(&self) -> String {
        self.raw
            .location
            .as_deref()
            .map(|loc| {
                let address = loc.split_once(',').map_or(loc, |(_, rest)| rest);
                address.trim().replace(' ', "+")
            })
            .unwrap_or_default()
    }

    pub fn is_declined(&self) -> bool {
        self.raw.is_declined()
    }

    pub fn is_recurring(&self) -> bool {
        self.raw.is_recurring()
    }

    pub fn html_link(&self) -> Option<&str> {
        self.raw.html_link.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.raw.description.as_deref()
    }

    /// The configured calendar this event was fetched from.
    pub fn origin(&self) -> Option<&CalendarEntity> {
        self.origin.as_ref()
    }

    /// The underlying payload.
    pub fn raw(&self) -> &RawEvent {
        &self.raw
    }
}

fn spans_several_days(start: &DateTime<Local>, end: &DateTime<Local>) -> bool {
    let duration = *end - *start;
    let day = Duration::hours(24);
    if duration > day {
        return true;
    }
    start.date_naive() != end.date_naive() && !(duration <= day && is_midnight(end))
}
