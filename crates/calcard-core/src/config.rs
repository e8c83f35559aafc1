//! Agenda configuration.
//!
//! [`CardConfig`] mirrors the keys of the dashboard card configuration
//! (camelCase, every key optional). [`EventRules`] holds the compiled form of
//! the title and location expressions so they are only built once per
//! configuration.

use std::time::Duration;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of days shown.
pub const DEFAULT_NUMBER_OF_DAYS: u32 = 7;

/// Default refresh interval in seconds (15 minutes).
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 15 * 60;

/// A configured calendar source.
///
/// Accepts either a bare entity id (`"calendar.work"`) or an object with an
/// optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntityRepr")]
pub struct CalendarEntity {
    /// The calendar entity id.
    pub entity: String,
    /// Display name, used for failures and origin labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CalendarEntity {
    /// Creates an entity without a display name.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            name: None,
        }
    }

    /// Builder method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the display name, falling back to the entity id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.entity)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityRepr {
    Id(String),
    Full {
        entity: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<EntityRepr> for CalendarEntity {
    fn from(repr: EntityRepr) -> Self {
        match repr {
            EntityRepr::Id(entity) => Self::new(entity),
            EntityRepr::Full { entity, name } => Self { entity, name },
        }
    }
}

/// Full agenda configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardConfig {
    /// Calendar sources, in display priority order.
    pub entities: Vec<CalendarEntity>,
    /// Number of days to fetch and show, starting today.
    pub number_of_days: u32,
    /// Split events spanning several days into one entry per day.
    pub show_multi_day: bool,
    /// Drop events whose title matches (case-insensitive).
    pub ignore_events_expression: Option<String>,
    /// Drop events whose location matches (case-insensitive).
    pub ignore_events_by_location_expression: Option<String>,
    /// Drop events the calendar owner declined.
    pub hide_declined: bool,
    /// Drop events that have already ended.
    pub hide_past_events: bool,
    /// Maximum number of events shown.
    pub events_limit: Option<usize>,
    /// Cut the last day instead of showing it whole once the limit is reached.
    pub hard_limit: bool,
    /// Regular expression removed from every event title.
    pub remove_from_event_title: Option<String>,
    /// Show events that started before today under today.
    pub start_from_today: bool,
    /// Notify service receiving "new event" notifications.
    pub notify_entity: Option<String>,
    /// Seconds a fetched agenda stays fresh.
    #[serde(rename = "refreshInterval")]
    pub refresh_interval_secs: u64,

    /// Card title.
    pub title: Option<String>,
    /// strftime format for event times.
    pub time_format: String,
    /// strftime format for day headers.
    pub date_format: String,
    pub hide_time: bool,
    pub progress_bar: bool,
    pub show_location: bool,
    pub show_event_origin: bool,
    pub full_day_event_text: String,
    pub start_text: String,
    pub end_text: String,
    /// strftime format used in notification messages.
    pub notify_date_time_format: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            number_of_days: DEFAULT_NUMBER_OF_DAYS,
            show_multi_day: false,
            ignore_events_expression: None,
            ignore_events_by_location_expression: None,
            hide_declined: false,
            hide_past_events: false,
            events_limit: None,
            hard_limit: false,
            remove_from_event_title: None,
            start_from_today: false,
            notify_entity: None,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            title: None,
            time_format: "%H:%M".to_string(),
            date_format: "%a %d %b".to_string(),
            hide_time: false,
            progress_bar: false,
            show_location: false,
            show_event_origin: false,
            full_day_event_text: "All day".to_string(),
            start_text: "Start".to_string(),
            end_text: "End".to_string(),
            notify_date_time_format: "%a %d %b %H:%M".to_string(),
        }
    }
}

impl CardConfig {
    /// Creates a configuration for the given entities with default options.
    pub fn with_entities(entities: impl IntoIterator<Item = CalendarEntity>) -> Self {
        Self {
            entities: entities.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns how long a fetched agenda stays fresh.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Returns the configured entity with the given id.
    pub fn entity(&self, entity_id: &str) -> Option<&CalendarEntity> {
        self.entities.iter().find(|e| e.entity == entity_id)
    }

    /// Checks that the configuration can drive the agenda.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoEntities`] if no calendar is configured,
    /// [`ConfigError::EmptyEntity`] for a blank entity id, and
    /// [`ConfigError::InvalidExpression`] for an expression that does not
    /// compile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entities.is_empty() {
            return Err(ConfigError::NoEntities);
        }
        if let Some(index) = self.entities.iter().position(|e| e.entity.trim().is_empty()) {
            return Err(ConfigError::EmptyEntity { index });
        }
        EventRules::from_config(self).map(|_| ())
    }
}

/// Compiled title and location rules.
#[derive(Debug, Clone, Default)]
pub struct EventRules {
    ignore_title: Option<Regex>,
    ignore_location: Option<Regex>,
    remove_from_title: Option<Regex>,
}

impl EventRules {
    /// Compiles the expressions of a configuration.
    ///
    /// Empty expressions are treated as absent.
    pub fn from_config(config: &CardConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            ignore_title: compile(
                "ignoreEventsExpression",
                config.ignore_events_expression.as_deref(),
            )?,
            ignore_location: compile(
                "ignoreEventsByLocationExpression",
                config.ignore_events_by_location_expression.as_deref(),
            )?,
            remove_from_title: compile(
                "removeFromEventTitle",
                config.remove_from_event_title.as_deref(),
            )?,
        })
    }

    /// Returns the display title: every match of the removal expression
    /// deleted, then trimmed.
    pub fn clean_title(&self, title: &str) -> String {
        match &self.remove_from_title {
            Some(re) => re.replace_all(title, "").trim().to_string(),
            None => title.trim().to_string(),
        }
    }

    /// Returns true if the title matches the ignore expression.
    pub fn ignores_title(&self, title: &str) -> bool {
        !title.is_empty() && self.ignore_title.as_ref().is_some_and(|re| re.is_match(title))
    }

    /// Returns true if the location matches the location ignore expression.
    pub fn ignores_location(&self, location: &str) -> bool {
        !location.is_empty()
            && self
                .ignore_location
                .as_ref()
                .is_some_and(|re| re.is_match(location))
    }
}

fn compile(field: &'static str, expression: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    expression
        .filter(|e| !e.is_empty())
        .map(|e| {
            RegexBuilder::new(e)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidExpression { field, source })
        })
        .transpose()
}
