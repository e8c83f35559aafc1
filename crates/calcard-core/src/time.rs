//! Local-time helpers for calendar events.
//!
//! Every boundary the agenda cares about (start of today, midnight of a
//! fragment's day, end of day) is expressed in the viewer's local timezone.
//! This module provides those boundaries and the [`FetchWindow`] used when
//! querying calendar backends.

use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Wire format of the fetch window bounds (local wall clock, no offset).
const QUERY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Resolves a naive local date-time to an instant in the local timezone.
///
/// Ambiguous times (clocks going back) resolve to the earliest instant. Times
/// that do not exist (clocks going forward) are shifted one hour later, which
/// is how wall clocks read on the other side of the gap.
pub fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// Returns local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    resolve_local(date.and_time(NaiveTime::MIN))
}

/// Returns the last millisecond (23:59:59.999) of `date` in local time.
pub fn end_of_day(date: NaiveDate) -> DateTime<Local> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid time");
    resolve_local(date.and_time(last))
}

/// Returns true if the wall-clock time is exactly 00:00:00.000.
pub fn is_midnight<Tz: TimeZone>(dt: &DateTime<Tz>) -> bool {
    dt.naive_local().time() == NaiveTime::MIN
}

/// Returns local midnight of the day `now` falls on.
pub fn start_of_today(now: &DateTime<Local>) -> DateTime<Local> {
    start_of_day(now.date_naive())
}

/// Adds whole calendar days to a date.
pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date + Days::new(u64::from(days))
}

/// The range of days the agenda fetches and displays.
///
/// Spans `[start of today, start of today + number_of_days)` in local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchWindow {
    /// Local midnight of the first day (inclusive).
    pub start: DateTime<Local>,
    /// Local midnight after the last day (exclusive).
    pub end: DateTime<Local>,
}

impl FetchWindow {
    /// Creates the window covering `days` days starting today.
    pub fn for_days(now: &DateTime<Local>, days: u32) -> Self {
        let today = now.date_naive();
        Self {
            start: start_of_day(today),
            end: start_of_day(add_days(today, days)),
        }
    }

    /// Returns the `start` query bound.
    ///
    /// The calendar backend expects the local wall-clock time followed by a
    /// literal `Z`, even though the value is not UTC.
    pub fn query_start(&self) -> String {
        format!("{}Z", self.start.format(QUERY_FORMAT))
    }

    /// Returns the `end` query bound, formatted like [`Self::query_start`].
    pub fn query_end(&self) -> String {
        format!("{}Z", self.end.format(QUERY_FORMAT))
    }
}
