//! Faros events API client
//!
//! Submits [`Event`]s to `POST {url}/graphs/{graph}/events`. Retry and
//! timeout behavior come from [`HttpClient`]; this type owns authentication,
//! endpoint construction and the [`EventSender`] port implementation.

use std::time::Duration;

use async_trait::async_trait;
use faros_core::EventSender;
use faros_domain::{Config, Event, FarosError, Result, SendOptions};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use tracing::{debug, info, instrument};
use url::Url;

use crate::http::HttpClient;

/// Client identifier sent with every request
pub const USER_AGENT: &str = concat!("faros-sync/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Total attempts per event, first try included
pub const MAX_ATTEMPTS: u32 = 3;

const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Create an events client for the resolved configuration.
///
/// # Errors
/// Returns `FarosError::Config` if no API key was resolved or the URL is
/// unusable.
pub fn create_client(config: &Config) -> Result<EventClient> {
    EventClient::builder(config).build()
}

/// Authenticated client for the events endpoint
#[derive(Clone)]
pub struct EventClient {
    http: HttpClient,
    base_url: Url,
}

impl std::fmt::Debug for EventClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClient").field("base_url", &self.base_url.as_str()).finish()
    }
}

impl EventClient {
    pub fn builder(config: &Config) -> EventClientBuilder<'_> {
        EventClientBuilder { config, base_backoff: BASE_BACKOFF, timeout: REQUEST_TIMEOUT }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint for submitting events to `graph`.
    pub fn events_url(&self, graph: &str, options: SendOptions) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["graphs", graph, "events"]);
        }
        url.query_pairs_mut()
            .append_pair("full", bool_str(options.full))
            .append_pair("validateOnly", bool_str(options.validate_only));
        url
    }

    /// Submit one event.
    ///
    /// # Errors
    /// Returns `FarosError::Http` with the response status and body, or
    /// `FarosError::Network`, once retries are exhausted or for a
    /// non-retryable status.
    #[instrument(skip(self, event), fields(event_type = %event.event_type(), graph = %graph))]
    pub async fn send_event(&self, graph: &str, event: &Event, options: SendOptions) -> Result<()> {
        let url = self.events_url(graph, options);
        debug!(url = %url, validate_only = options.validate_only, "Submitting event");

        let builder = self.http.request(Method::POST, url).json(event);
        self.http.send(builder).await?;

        info!("Event accepted");
        Ok(())
    }
}

#[async_trait]
impl EventSender for EventClient {
    async fn send_event(&self, graph: &str, event: &Event, options: SendOptions) -> Result<()> {
        EventClient::send_event(self, graph, event, options).await
    }
}

/// Builder for [`EventClient`]
#[derive(Debug)]
pub struct EventClientBuilder<'a> {
    config: &'a Config,
    base_backoff: Duration,
    timeout: Duration,
}

impl EventClientBuilder<'_> {
    /// Delay before the first retry. Tests shorten it.
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// # Errors
    /// Returns `FarosError::Config` if the API key is absent or invalid as a
    /// header value, or the base URL does not parse.
    pub fn build(self) -> Result<EventClient> {
        let key = self
            .config
            .api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                FarosError::Config(
                    "Faros API key is required; set FAROS_API_KEY or pass --api-key".to_string(),
                )
            })?;

        let mut auth = HeaderValue::from_str(key.expose())
            .map_err(|_| FarosError::Config("API key is not a valid header value".to_string()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let raw_url = &self.config.url;
        let base_url = Url::parse(raw_url)
            .map_err(|e| FarosError::Config(format!("url: invalid URL '{raw_url}': {e}")))?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .max_attempts(MAX_ATTEMPTS)
            .base_backoff(self.base_backoff)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(EventClient { http, base_url })
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
