//! Client configuration.
//!
//! All settings live in `~/.config/calcard/config.toml` by default:
//!
//! ```toml
//! [homeassistant]
//! url = "http://homeassistant.local:8123"
//! token = "env::HASS_TOKEN"
//!
//! [card]
//! entities = ["calendar.home", { entity = "calendar.work", name = "Work" }]
//! numberOfDays = 5
//! showMultiDay = true
//! ```
//!
//! The `[card]` table takes the same keys as the dashboard card.

use std::path::{Path, PathBuf};
use std::time::Duration;

use calcard_core::CardConfig;
use calcard_providers::homeassistant::HomeAssistantConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Configuration for the calcard client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug logging.
    pub debug: bool,

    /// Home Assistant connection.
    pub homeassistant: Option<HomeAssistantSettings>,

    /// Agenda options.
    pub card: CardConfig,
}

/// Home Assistant connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeAssistantSettings {
    /// Base URL of the instance.
    pub url: String,

    /// Long-lived access token (supports `env::` and `pass::` prefixes).
    pub token: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    HomeAssistantConfig::DEFAULT_TIMEOUT_SECS
}

impl HomeAssistantSettings {
    /// Resolves the token and builds the provider configuration.
    pub fn to_provider_config(&self) -> Result<HomeAssistantConfig, String> {
        let token = secret::resolve(&self.token)?;
        HomeAssistantConfig::new(&self.url, token)
            .map(|config| config.with_timeout(Duration::from_secs(self.timeout_secs)))
            .map_err(|e| format!("invalid Home Assistant url {:?}: {}", self.url, e))
    }
}

impl ClientConfig {
    /// Loads the configuration from the default path, or defaults if the file
    /// does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the Home Assistant provider configuration.
    pub fn provider_config(&self) -> ClientResult<HomeAssistantConfig> {
        self.homeassistant
            .as_ref()
            .ok_or_else(|| ClientError::config("missing [homeassistant] section"))?
            .to_provider_config()
            .map_err(ClientError::Config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calcard")
            .join("config.toml")
    }
}
