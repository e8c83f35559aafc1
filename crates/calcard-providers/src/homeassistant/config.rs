//! Home Assistant connection settings.

use std::fmt;
use std::time::Duration;
use url::Url;

/// Connection settings for a Home Assistant instance.
#[derive(Clone)]
pub struct HomeAssistantConfig {
    /// Base URL of the instance, always ending with `/`.
    pub url: Url,

    /// Long-lived access token.
    pub token: String,

    /// Request timeout.
    pub timeout: Duration,

    pub user_agent: String,
}

impl HomeAssistantConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the instance at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>, token: impl Into<String>) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(url.as_ref())?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            url,
            token: token.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calcard/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if a non-empty token is configured.
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl fmt::Debug for HomeAssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomeAssistantConfig")
            .field("url", &self.url.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = HomeAssistantConfig::new("http://ha.local:8123", "tok").unwrap();
        assert_eq!(config.url.as_str(), "http://ha.local:8123/");

        let config = HomeAssistantConfig::new("https://example.com/ha", "tok").unwrap();
        assert_eq!(config.url.as_str(), "https://example.com/ha/");
    }

    #[test]
    fn builder_methods() {
        let config = HomeAssistantConfig::new("http://ha.local:8123/", "tok")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.user_agent.starts_with("calcard/"));
        assert!(config.has_token());
    }

    #[test]
    fn debug_redacts_token() {
        let config = HomeAssistantConfig::new("http://ha.local:8123", "s3cret").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn invalid_url() {
        assert!(HomeAssistantConfig::new("not a url", "tok").is_err());
    }
}
