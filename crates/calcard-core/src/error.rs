//! Error types for event construction and configuration.

use thiserror::Error;

/// A single raw event could not be turned into a [`CalendarEvent`].
///
/// These errors are always local to one payload: the normalizer logs them and
/// continues with the rest of the batch.
///
/// [`CalendarEvent`]: crate::event::CalendarEvent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The payload has no `start` field at all.
    #[error("event {key} has no start time")]
    MissingStart { key: String },

    /// A `start`/`end` value could not be parsed as a date or date-time.
    #[error("invalid event time: {value:?}")]
    InvalidTime { value: String },
}

impl EventError {
    /// Creates a missing start error for the given event key.
    pub fn missing_start(key: impl Into<String>) -> Self {
        Self::MissingStart { key: key.into() }
    }

    /// Creates an invalid time error for the given raw value.
    pub fn invalid_time(value: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.into(),
        }
    }
}

/// The card configuration is unusable.
///
/// Configuration errors are fatal: they are raised when the configuration is
/// loaded, before any calendar is fetched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No calendar entity configured.
    #[error("You need to define at least one calendar entity via entities")]
    NoEntities,

    /// An entity entry has an empty id.
    #[error("calendar entity at position {index} has an empty id")]
    EmptyEntity { index: usize },

    /// A filter expression is not a valid regular expression.
    #[error("invalid expression for {field}: {source}")]
    InvalidExpression {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}
