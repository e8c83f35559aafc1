//! Raw event payloads as returned by calendar backends.
//!
//! Backends disagree on event shape: Google-style calendars send
//! `{"date": ...}` or `{"dateTime": ...}` objects, CalDAV bridges send bare
//! ISO strings, identifiers come as `id` or `uid`, titles as `summary` or
//! `title`. [`RawEvent`] accepts all of them, and [`RawEventTime`] resolves the
//! time shape exactly once, at deserialization.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::time::{resolve_local, start_of_day};

/// Formats accepted for date-times without an offset.
const FLOATING_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// The time specification of a raw event boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireTime", into = "WireTime")]
pub enum RawEventTime {
    /// A date without a time (all-day boundary).
    Date(NaiveDate),
    /// A date-time carrying an explicit UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// A date-time without offset, read as local wall-clock time.
    Floating(NaiveDateTime),
}

impl RawEventTime {
    /// Parses one time string in any of the supported shapes.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidTime`] if the value matches none of them.
    pub fn parse(value: &str) -> Result<Self, EventError> {
        let value = value.trim();

        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(Self::Date(date));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::DateTime(dt));
        }
        FLOATING_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(Self::Floating)
            .ok_or_else(|| EventError::invalid_time(value))
    }

    /// Resolves this boundary to a local instant.
    ///
    /// Dates resolve to local midnight.
    pub fn to_local(&self) -> DateTime<Local> {
        match self {
            Self::Date(date) => start_of_day(*date),
            Self::DateTime(dt) => dt.with_timezone(&Local),
            Self::Floating(naive) => resolve_local(*naive),
        }
    }
}

impl fmt::Display for RawEventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Floating(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Shapes a time boundary takes on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireTime {
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<String>,
        #[serde(default, rename = "dateTime", skip_serializing_if = "Option::is_none")]
        date_time: Option<String>,
    },
    Bare(String),
}

impl TryFrom<WireTime> for RawEventTime {
    type Error = EventError;

    fn try_from(wire: WireTime) -> Result<Self, Self::Error> {
        match wire {
            WireTime::Object {
                date: Some(date), ..
            } => match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
                Ok(date) => Ok(Self::Date(date)),
                Err(_) => Self::parse(&date),
            },
            WireTime::Object {
                date_time: Some(date_time),
                ..
            } => Self::parse(&date_time),
            WireTime::Object { .. } => Err(EventError::invalid_time("{}")),
            WireTime::Bare(value) => Self::parse(&value),
        }
    }
}

impl From<RawEventTime> for WireTime {
    fn from(time: RawEventTime) -> Self {
        match time {
            RawEventTime::Date(_) => WireTime::Object {
                date: Some(time.to_string()),
                date_time: None,
            },
            RawEventTime::DateTime(_) | RawEventTime::Floating(_) => WireTime::Object {
                date: None,
                date_time: Some(time.to_string()),
            },
        }
    }
}

/// The response status of an attendee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    /// The attendee has accepted the invitation.
    Accepted,
    /// The attendee has declined the invitation.
    Declined,
    /// The attendee has tentatively accepted.
    Tentative,
    /// The attendee has not responded.
    NeedsAction,
    /// Missing or unrecognised status.
    #[default]
    #[serde(other)]
    Unknown,
}

/// An attendee of a raw event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendee {
    /// The attendee's email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether this entry is the calendar owner.
    #[serde(default, rename = "self")]
    pub is_self: bool,
    /// The attendee's response.
    #[serde(default)]
    pub response_status: ResponseStatus,
}

impl RawAttendee {
    /// Creates the attendee entry for the calendar owner.
    pub fn myself(response_status: ResponseStatus) -> Self {
        Self {
            email: None,
            is_self: true,
            response_status,
        }
    }
}

/// Origin metadata some backends attach to events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSource {
    /// URL the event was imported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A raw calendar event as delivered by a backend.
///
/// All fields are optional on the wire. A missing `start` is only detected
/// when the event is adapted into a [`CalendarEvent`], so one bad payload
/// never fails a whole batch.
///
/// [`CalendarEvent`]: crate::event::CalendarEvent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Backend identifier (Google-style calendars).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Backend identifier (CalDAV-style calendars).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Event title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Alternative title field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-text `"place, address"` location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Start boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<RawEventTime>,
    /// End boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<RawEventTime>,
    /// Deep link to the event in the backend UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    /// Set on instances of a recurring series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_event_id: Option<String>,
    /// Attendees, including the calendar owner when the backend reports it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<RawAttendee>,
    /// Import origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RawSource>,
    /// The calendar entity this event was fetched from.
    ///
    /// Filled in by the fetcher, never read from the payload.
    #[serde(skip)]
    pub entity: Option<String>,
}

impl RawEvent {
    /// Creates an empty raw event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the backend identifier: `id`, falling back to `uid`.
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.uid.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// Returns `summary`, falling back to `title`, or an empty string.
    pub fn base_title(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_default()
    }

    /// Returns true if the calendar owner declined this event.
    pub fn is_declined(&self) -> bool {
        self.attendees
            .iter()
            .any(|a| a.is_self && a.response_status == ResponseStatus::Declined)
    }

    /// Returns true if this is an instance of a recurring series.
    pub fn is_recurring(&self) -> bool {
        self.recurring_event_id.is_some()
    }

    /// Builder method to set the `id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method to set the `uid`.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set both boundaries.
    pub fn with_times(mut self, start: RawEventTime, end: RawEventTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the deep link.
    pub fn with_html_link(mut self, link: impl Into<String>) -> Self {
        self.html_link = Some(link.into());
        self
    }

    /// Builder method to mark as recurring.
    pub fn with_recurring(mut self, recurring_event_id: impl Into<String>) -> Self {
        self.recurring_event_id = Some(recurring_event_id.into());
        self
    }

    /// Builder method to add an attendee.
    pub fn with_attendee(mut self, attendee: RawAttendee) -> Self {
        self.attendees.push(attendee);
        self
    }

    /// Builder method to set the source entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod time_shapes {
        use super::*;

        #[test]
        fn date_object() {
            let time: RawEventTime = serde_json::from_str(r#"{"date": "2024-03-01"}"#).unwrap();
            assert_eq!(time, RawEventTime::Date(date(2024, 3, 1)));
            assert_eq!(time.to_local(), Local.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        }

        #[test]
        fn date_time_object_with_offset() {
            let time: RawEventTime =
                serde_json::from_str(r#"{"dateTime": "2024-03-01T10:00:00+02:00"}"#).unwrap();
            let expected = DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z").unwrap();
            assert_eq!(time.to_local(), expected.with_timezone(&Local));
            assert!(matches!(time, RawEventTime::DateTime(_)));
        }

        #[test]
        fn bare_floating_string_is_local() {
            let time: RawEventTime = serde_json::from_str(r#""2024-03-01T22:00:00""#).unwrap();
            assert!(matches!(time, RawEventTime::Floating(_)));
            assert_eq!(
                time.to_local(),
                Local.with_ymd_and_hms(2024, 3, 1, 22, 0, 0).unwrap()
            );
        }

        #[test]
        fn bare_date_string() {
            let time: RawEventTime = serde_json::from_str(r#""2024-03-01""#).unwrap();
            assert_eq!(time, RawEventTime::Date(date(2024, 3, 1)));
        }

        #[test]
        fn date_wins_over_date_time() {
            let time: RawEventTime = serde_json::from_str(
                r#"{"date": "2024-03-01", "dateTime": "2024-03-01T10:00:00Z"}"#,
            )
            .unwrap();
            assert_eq!(time, RawEventTime::Date(date(2024, 3, 1)));
        }

        #[test]
        fn garbage_is_rejected() {
            assert!(serde_json::from_str::<RawEventTime>(r#""next tuesday""#).is_err());
            assert!(serde_json::from_str::<RawEventTime>(r#"{}"#).is_err());
            assert_eq!(
                RawEventTime::parse("soon"),
                Err(EventError::invalid_time("soon"))
            );
        }

        #[test]
        fn serializes_back_to_object_shape() {
            let time = RawEventTime::Date(date(2024, 3, 1));
            let json = serde_json::to_value(&time).unwrap();
            assert_eq!(json, serde_json::json!({"date": "2024-03-01"}));
        }
    }

    mod raw_event {
        use super::*;

        #[test]
        fn google_style_payload() {
            let raw: RawEvent = serde_json::from_value(serde_json::json!({
                "id": "abc",
                "summary": "Standup",
                "start": {"dateTime": "2024-03-01T09:00:00+00:00"},
                "end": {"dateTime": "2024-03-01T09:15:00+00:00"},
                "htmlLink": "https://calendar.example.com/abc",
                "recurringEventId": "series-1",
                "location": "Room 4, 1 Main St",
                "attendees": [
                    {"email": "me@example.com", "self": true, "responseStatus": "accepted"},
                    {"email": "you@example.com", "responseStatus": "needsAction"}
                ],
                "colorId": "7"
            }))
            .unwrap();

            assert_eq!(raw.key(), Some("abc"));
            assert_eq!(raw.base_title(), "Standup");
            assert!(raw.is_recurring());
            assert!(!raw.is_declined());
            assert_eq!(raw.attendees[1].response_status, ResponseStatus::NeedsAction);
            assert!(raw.entity.is_none());
        }

        #[test]
        fn caldav_style_payload() {
            let raw: RawEvent = serde_json::from_value(serde_json::json!({
                "uid": "uid-1",
                "title": "Dentist",
                "start": "2024-03-01T14:00:00",
                "end": "2024-03-01T15:00:00",
                "source": {"url": "https://dav.example.com/cal.ics"}
            }))
            .unwrap();

            assert_eq!(raw.key(), Some("uid-1"));
            assert_eq!(raw.base_title(), "Dentist");
            assert_eq!(
                raw.source.and_then(|s| s.url).as_deref(),
                Some("https://dav.example.com/cal.ics")
            );
        }

        #[test]
        fn missing_start_still_deserializes() {
            let raw: RawEvent = serde_json::from_value(serde_json::json!({"id": "x"})).unwrap();
            assert!(raw.start.is_none());
            assert_eq!(raw.base_title(), "");
        }

        #[test]
        fn empty_id_falls_back_to_nothing() {
            let raw = RawEvent::new().with_id("");
            assert_eq!(raw.key(), None);
        }

        #[test]
        fn declined_requires_self() {
            let other = RawAttendee {
                email: Some("x@example.com".into()),
                is_self: false,
                response_status: ResponseStatus::Declined,
            };
            let raw = RawEvent::new().with_attendee(other);
            assert!(!raw.is_declined());

            let raw = raw.with_attendee(RawAttendee::myself(ResponseStatus::Declined));
            assert!(raw.is_declined());
        }

        #[test]
        fn unknown_response_status() {
            let attendee: RawAttendee =
                serde_json::from_str(r#"{"self": true, "responseStatus": "maybe-later"}"#).unwrap();
            assert_eq!(attendee.response_status, ResponseStatus::Unknown);
        }
    }
}
