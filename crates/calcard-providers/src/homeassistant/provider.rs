//! [`CalendarApi`] over the Home Assistant calendar endpoint.

use calcard_core::{FetchWindow, RawEvent};
use serde_json::Value;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarApi, decode_events};

use super::client::HomeAssistantClient;
use super::config::HomeAssistantConfig;

const PROVIDER_NAME: &str = "homeassistant";

/// Reads calendar entities from a Home Assistant instance.
#[derive(Debug, Clone)]
pub struct HomeAssistantProvider {
    client: HomeAssistantClient,
}

impl HomeAssistantProvider {
    /// Creates a provider for the configured instance.
    pub fn new(config: HomeAssistantConfig) -> ProviderResult<Self> {
        let client = HomeAssistantClient::new(config).map_err(|e| e.with_backend(PROVIDER_NAME))?;
        Ok(Self { client })
    }

    /// The underlying client, shared with notification dispatch.
    pub fn client(&self) -> &HomeAssistantClient {
        &self.client
    }
}

impl CalendarApi for HomeAssistantProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_events<'a>(
        &'a self,
        entity_id: &'a str,
        window: &'a FetchWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            let url = self
                .client
                .calendar_url(entity_id, window)
                .map_err(|e| e.with_backend(PROVIDER_NAME).for_entity(entity_id))?;
            debug!(
                entity = %entity_id,
                start = %window.query_start(),
                end = %window.query_end(),
                "Fetching calendar events"
            );

            let body = self
                .client
                .get(url)
                .await
                .map_err(|e| e.with_backend(PROVIDER_NAME).for_entity(entity_id))?;
            let events = parse_events(entity_id, &body)?;
            debug!(entity = %entity_id, count = events.len(), "Fetched calendar events");
            Ok(events)
        })
    }
}

/// Parses the calendar endpoint body: a JSON array of event payloads.
fn parse_events(entity_id: &str, body: &str) -> ProviderResult<Vec<RawEvent>> {
    let payloads: Vec<Value> = serde_json::from_str(body).map_err(|e| {
        ProviderError::malformed(format!("expected an event list: {}", e))
            .with_source(e)
            .with_backend(PROVIDER_NAME)
            .for_entity(entity_id)
    })?;
    Ok(decode_events(entity_id, payloads))
}
