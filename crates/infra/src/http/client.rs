use std::time::Duration;

use faros_common::resilience::policies::PredicateRetry;
use faros_common::resilience::{RetryConfig, RetryExecutor};
use faros_domain::{FarosError, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

type TransientOnly = PredicateRetry<fn(&FarosError, u32) -> bool>;

fn is_transient(error: &FarosError, _attempt: u32) -> bool {
    error.is_retryable()
}

/// HTTP client with built-in retry and timeout support.
///
/// Non-2xx responses are turned into [`FarosError::Http`] carrying the
/// response body; transport failures become [`FarosError::Network`]. Only
/// errors for which [`FarosError::is_retryable`] holds are attempted again.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryExecutor<TransientOnly>,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry.config().max_attempts
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// # Errors
    /// Returns the error of the final attempt once retries are exhausted, or
    /// the first non-retryable error.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.retry
            .execute(|attempt| {
                let cloned = builder.try_clone();
                async move {
                    let cloned = cloned.ok_or_else(|| {
                        FarosError::Internal(
                            "request body cannot be cloned; buffer the body to enable retries"
                                .into(),
                        )
                    })?;
                    self.send_once(cloned, attempt).await
                }
            })
            .await
            .map_err(|err| err.into_inner())
    }

    async fn send_once(&self, builder: RequestBuilder, attempt: u32) -> Result<Response> {
        let request = builder
            .build()
            .map_err(|err| FarosError::Internal(format!("invalid request: {err}")))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");
            FarosError::Network(err.to_string())
        })?;

        let status = response.status();
        debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(FarosError::http(status.as_u16(), body))
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Delay before the first retry; doubles on each further retry.
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// # Errors
    /// Returns `FarosError::Config` if the retry settings are invalid or the
    /// underlying client cannot be constructed.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| FarosError::Config(format!("failed to build HTTP client: {err}")))?;

        let max_delay = self.base_backoff.saturating_mul(16).max(Duration::from_millis(1));
        let config = RetryConfig::builder()
            .max_attempts(self.max_attempts.max(1))
            .exponential_backoff(self.base_backoff, 2.0, max_delay)
            .build()
            .map_err(FarosError::Config)?;

        let predicate: fn(&FarosError, u32) -> bool = is_transient;
        Ok(HttpClient { client, retry: RetryExecutor::new(config, PredicateRetry::new(predicate)) })
    }
}
