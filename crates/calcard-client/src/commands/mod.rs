//! Command implementations.

pub mod agenda;
pub mod config;
pub mod watch;

use calcard_providers::homeassistant::HomeAssistantProvider;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Validates the card options and connects the Home Assistant backend.
pub(crate) fn build_provider(config: &ClientConfig) -> ClientResult<HomeAssistantProvider> {
    config.card.validate()?;
    let provider_config = config.provider_config()?;
    Ok(HomeAssistantProvider::new(provider_config)?)
}
