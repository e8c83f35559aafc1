//! The calendar backend abstraction.
//!
//! A [`CalendarApi`] answers one question: which raw events does calendar
//! entity X have in a given window. Payloads are decoded one at a time with
//! [`decode_events`], so a single malformed event never fails a whole fetch.

use std::future::Future;
use std::pin::Pin;

use calcard_core::{FetchWindow, RawEvent};
use serde_json::Value;
use tracing::warn;

use crate::error::ProviderResult;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A calendar backend.
///
/// Implementations must be `Send + Sync`: the pipeline issues one fetch per
/// configured entity concurrently against the same value.
pub trait CalendarApi: Send + Sync {
    /// Returns the backend name (e.g. "homeassistant").
    fn name(&self) -> &str;

    /// Fetches the raw events of one calendar entity within `window`.
    ///
    /// Returned events have [`RawEvent::entity`] set to `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` when the calendar could not be read at all.
    fn fetch_events<'a>(
        &'a self,
        entity_id: &'a str,
        window: &'a FetchWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>>;
}

/// Decodes a JSON array of event payloads, dropping the ones that do not
/// decode.
pub fn decode_events(entity_id: &str, payloads: Vec<Value>) -> Vec<RawEvent> {
    payloads
        .into_iter()
        .enumerate()
        .filter_map(|(index, payload)| match serde_json::from_value::<RawEvent>(payload) {
            Ok(event) => Some(event.with_entity(entity_id)),
            Err(e) => {
                warn!(entity = %entity_id, index, error = %e, "Dropping malformed event payload");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_tags_entity() {
        let events = decode_events(
            "calendar.work",
            vec![
                json!({"id": "1", "summary": "A", "start": {"dateTime": "2024-03-05T09:00:00Z"}}),
                json!({"uid": "2", "title": "B", "start": "2024-03-05"}),
            ],
        );
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.entity.as_deref() == Some("calendar.work")));
        assert_eq!(events[1].key(), Some("2"));
    }

    #[test]
    fn decode_skips_malformed_payloads() {
        let events = decode_events(
            "calendar.work",
            vec![
                json!({"id": "bad", "start": {"dateTime": "tomorrow-ish"}}),
                json!("not an object"),
                json!({"id": "good", "start": "2024-03-05T09:00:00"}),
            ],
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key(), Some("good"));
    }

    #[test]
    fn missing_start_survives_decoding() {
        let events = decode_events("calendar.work", vec![json!({"id": "nostart"})]);
        assert_eq!(events.len(), 1);
        assert!(events[0].start.is_none());
    }
}
