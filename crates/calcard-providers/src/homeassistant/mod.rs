//! Home Assistant calendar backend.
//!
//! Reads events through the REST calendar API
//! (`GET /api/calendars/{entity}?start=...&end=...`) and calls notify
//! services (`POST /api/services/notify/{service}`), authenticating with a
//! long-lived access token.
//!
//! ```ignore
//! use calcard_providers::homeassistant::{HomeAssistantConfig, HomeAssistantProvider};
//!
//! let config = HomeAssistantConfig::new("http://homeassistant.local:8123", token)?;
//! let provider = HomeAssistantProvider::new(config)?;
//! let events = provider.fetch_events("calendar.work", &window).await?;
//! ```

mod client;
mod config;
mod provider;

pub use client::HomeAssistantClient;
pub use config::HomeAssistantConfig;
pub use provider::HomeAssistantProvider;
