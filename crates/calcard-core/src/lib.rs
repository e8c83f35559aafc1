//! Core types: raw payloads, calendar events, multi-day splitting, day
//! grouping and display formatting.

pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod group;
pub mod raw_event;
pub mod split;
pub mod time;
pub mod tracing;

pub use config::{CalendarEntity, CardConfig, EventRules};
pub use error::{ConfigError, EventError};
pub use event::{CalendarEvent, Fragment};
pub use format::{event_time_text, map_url, progress_percent};
pub use group::{DayGroup, GroupOptions, group_by_day};
pub use raw_event::{RawAttendee, RawEvent, RawEventTime, RawSource, ResponseStatus};
pub use split::split_multi_day;
pub use time::FetchWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
