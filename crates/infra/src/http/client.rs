use std::time::Duration;

use leadsync_domain::LeadSyncError;
use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// Set to bypass system proxy settings for every client built here
pub const DISABLE_PROXY_ENV: &str = "LEADSYNC_DISABLE_PROXY";

/// Single-shot HTTP client.
///
/// Never retries on its own: throttling is handled one level up by the
/// rate-limited caller, and every other failure is surfaced to the caller
/// as-is.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, LeadSyncError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder once.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, reqwest::Error> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(err)
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    no_proxy: bool,
}

impl HttpClientBuilder {
    /// Per-request timeout. Unset keeps reqwest's default (no timeout).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Ignore `HTTP(S)_PROXY`. Also enabled by [`DISABLE_PROXY_ENV`].
    pub fn no_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    fn proxy_disabled(&self) -> bool {
        self.no_proxy || std::env::var_os(DISABLE_PROXY_ENV).is_some()
    }

    pub fn build(self) -> Result<HttpClient, LeadSyncError> {
        let mut builder = ReqwestClient::builder();

        if self.proxy_disabled() {
            builder = builder.no_proxy();
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            LeadSyncError::from(infra)
        })?;

        Ok(HttpClient { client })
    }
}
