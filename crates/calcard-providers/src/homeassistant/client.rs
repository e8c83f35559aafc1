//! HTTP client for the Home Assistant REST API.

use calcard_core::FetchWindow;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};

use super::config::HomeAssistantConfig;

/// HTTP client bound to one Home Assistant instance.
#[derive(Debug, Clone)]
pub struct HomeAssistantClient {
    client: Client,
    config: HomeAssistantConfig,
}

impl HomeAssistantClient {
    /// Creates a client for the configured instance.
    ///
    /// # Errors
    ///
    /// Returns a configuration error without a token, or a network error if
    /// the HTTP client cannot be built.
    pub fn new(config: HomeAssistantConfig) -> ProviderResult<Self> {
        if !config.has_token() {
            return Err(ProviderError::misconfigured(
                "Home Assistant access token is empty",
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::unreachable(format!("Failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self { client, config })
    }

    /// Builds `api/calendars/{entity}?start={start}Z&end={end}Z`.
    pub fn calendar_url(&self, entity_id: &str, window: &FetchWindow) -> ProviderResult<Url> {
        let mut url = self.join(&format!(
            "api/calendars/{}",
            urlencoding::encode(entity_id)
        ))?;
        url.set_query(Some(&format!(
            "start={}&end={}",
            window.query_start(),
            window.query_end()
        )));
        Ok(url)
    }

    /// Builds `api/services/{domain}/{service}`.
    pub fn service_url(&self, domain: &str, service: &str) -> ProviderResult<Url> {
        self.join(&format!(
            "api/services/{}/{}",
            urlencoding::encode(domain),
            urlencoding::encode(service)
        ))
    }

    fn join(&self, path: &str) -> ProviderResult<Url> {
        self.config.url.join(path).map_err(|e| {
            ProviderError::misconfigured(format!("Invalid API path {}: {}", path, e)).with_source(e)
        })
    }

    /// Performs an authenticated GET and returns the body.
    pub async fn get(&self, url: Url) -> ProviderResult<String> {
        trace!(url = %url, "Sending GET");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| ProviderError::unreachable(format!("Request failed: {}", e)).with_source(e))?;

        self.handle_response(response).await
    }

    /// Performs an authenticated POST with a JSON body and returns the body.
    pub async fn post_json(&self, url: Url, body: &Value) -> ProviderResult<String> {
        let body = serde_json::to_string(body).map_err(|e| {
            ProviderError::new(
                ProviderErrorCode::Rejected,
                format!("Failed to encode request body: {}", e),
            )
            .with_source(e)
        })?;

        trace!(url = %url, "Sending POST");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::unreachable(format!("Request failed: {}", e)).with_source(e))?;

        self.handle_response(response).await
    }

    /// Calls a service, e.g. `notify.mobile_app_phone`.
    pub async fn call_service(&self, domain: &str, service: &str, data: &Value) -> ProviderResult<()> {
        let url = self.service_url(domain, service)?;
        debug!(domain = %domain, service = %service, "Calling service");
        self.post_json(url, data).await.map(|_| ())
    }

    async fn handle_response(&self, response: Response) -> ProviderResult<String> {
        let status = response.status();
        trace!(status = %status, "Received response");

        if status.is_success() {
            return response
                .text()
                .await
                .map_err(|e| ProviderError::unreachable(format!("Failed to read response: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        if !status.is_client_error() && !status.is_server_error() {
            warn!(status = %status, body = %body, "Unexpected response status");
        }
        Err(ProviderError::from_status(status.as_u16(), &body))
    }

    /// Returns the base URL of the instance.
    pub fn base_url(&self) -> &str {
        self.config.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn client() -> HomeAssistantClient {
        let config = HomeAssistantConfig::new("http://ha.local:8123", "token").unwrap();
        HomeAssistantClient::new(config).unwrap()
    }

    #[test]
    fn empty_token_is_rejected() {
        let config = HomeAssistantConfig::new("http://ha.local:8123", " ").unwrap();
        let err = HomeAssistantClient::new(config).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Misconfigured);
    }

    #[test]
    fn calendar_url_carries_window() {
        let now = Local.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap();
        let window = FetchWindow::for_days(&now, 7);
        let url = client().calendar_url("calendar.work", &window).unwrap();
        assert_eq!(
            url.as_str(),
            "http://ha.local:8123/api/calendars/calendar.work?start=2024-03-04T00:00:00Z&end=2024-03-11T00:00:00Z"
        );
    }

    #[test]
    fn calendar_url_encodes_entity() {
        let now = Local.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap();
        let window = FetchWindow::for_days(&now, 1);
        let url = client().calendar_url("calendar.a/b", &window).unwrap();
        assert!(url.path().ends_with("/api/calendars/calendar.a%2Fb"));
    }

    #[test]
    fn service_url() {
        let url = client().service_url("notify", "mobile_app_phone").unwrap();
        assert_eq!(
            url.as_str(),
            "http://ha.local:8123/api/services/notify/mobile_app_phone"
        );
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let config = HomeAssistantConfig::new("https://example.com/ha", "token").unwrap();
        let client = HomeAssistantClient::new(config).unwrap();
        assert_eq!(client.base_url(), "https://example.com/ha/");
        assert_eq!(
            client.service_url("notify", "x").unwrap().as_str(),
            "https://example.com/ha/api/services/notify/x"
        );
    }
}
