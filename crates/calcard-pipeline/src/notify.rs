//! "New calendar event" notifications.
//!
//! After a fetch, every event id that was not in the previous snapshot is
//! announced through a [`NotifySink`]. The first fetch of a pipeline never
//! notifies: there is nothing to compare against.

use std::collections::HashSet;

use calcard_core::{CalendarEvent, CardConfig, event_time_text};
use calcard_providers::BoxFuture;
use tracing::{debug, error, info};

use crate::error::NotifyError;
use crate::pipeline::AgendaSnapshot;

/// A notification ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    /// Builds the announcement for a newly seen event.
    pub fn new_event(event: &CalendarEvent, config: &CardConfig) -> Self {
        Self {
            title: format!("New Calendar Event: {}", event.title()),
            message: event_time_text(event, config, &config.notify_date_time_format),
        }
    }
}

/// Delivers notifications to a named service.
pub trait NotifySink: Send + Sync {
    fn send<'a>(
        &'a self,
        service: &'a str,
        notification: &'a Notification,
    ) -> BoxFuture<'a, Result<(), NotifyError>>;
}

#[cfg(feature = "homeassistant")]
impl NotifySink for calcard_providers::homeassistant::HomeAssistantClient {
    fn send<'a>(
        &'a self,
        service: &'a str,
        notification: &'a Notification,
    ) -> BoxFuture<'a, Result<(), NotifyError>> {
        Box::pin(async move {
            let data = serde_json::json!({
                "title": notification.title,
                "message": notification.message,
            });
            self.call_service("notify", service, &data)
                .await
                .map_err(|e| NotifyError::dispatch(service, e))
        })
    }
}

/// Returns the events of `current` whose id is not in `previous`.
pub fn new_events<'a>(previous: &AgendaSnapshot, current: &'a AgendaSnapshot) -> Vec<&'a CalendarEvent> {
    let known: HashSet<&str> = previous.events.iter().map(CalendarEvent::id).collect();
    current
        .events
        .iter()
        .filter(|event| !known.contains(event.id()))
        .collect()
}

/// Announces new events through a sink.
pub struct Notifier<S> {
    sink: S,
}

impl<S: NotifySink> Notifier<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Sends one notification per new event and returns how many were
    /// delivered.
    ///
    /// Nothing is sent without a previous snapshot or without
    /// `notifyEntity`. Delivery failures are logged and skipped.
    pub async fn notify_new_events(
        &self,
        config: &CardConfig,
        previous: Option<&AgendaSnapshot>,
        current: &AgendaSnapshot,
    ) -> usize {
        let (Some(previous), Some(service)) = (previous, config.notify_entity.as_deref()) else {
            return 0;
        };

        let fresh = new_events(previous, current);
        debug!(count = fresh.len(), service = %service, "New events to announce");

        let mut delivered = 0;
        for event in fresh {
            let notification = Notification::new_event(event, config);
            match self.sink.send(service, &notification).await {
                Ok(()) => {
                    info!(title = %event.title(), "Sent new event notification");
                    delivered += 1;
                }
                Err(e) => error!(error = %e, title = %event.title(), "Failed to send notification"),
            }
        }
        delivered
    }
}
