use std::time::Duration;

use async_trait::async_trait;
use leadsync_core::CrmGateway;
use leadsync_domain::{CrmConfig, CrmPayload, EndpointConfig, LeadSyncError, VerifyMethod};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::CrmHttpError;
use crate::http::HttpClient;

const JSON: &str = "application/json";
const VERSION_HEADER: &str = "Version";

/// reqwest-backed [`CrmGateway`]
///
/// Stateless apart from connection settings: the access token is passed on
/// every call, so one client can serve any number of engines.
#[derive(Debug, Clone)]
pub struct CrmClient {
    http: HttpClient,
    base_url: String,
    api_version: Option<String>,
    endpoints: EndpointConfig,
}

impl CrmClient {
    /// Build a client from connection settings
    ///
    /// # Errors
    /// [`LeadSyncError::Config`] when the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &CrmConfig) -> Result<Self, LeadSyncError> {
        let mut builder =
            HttpClient::builder().user_agent(concat!("leadsync/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_http_client(builder.build()?, config))
    }

    pub fn with_http_client(http: HttpClient, config: &CrmConfig) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            endpoints: config.endpoints.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, access_token: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .bearer_auth(access_token)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);
        if let Some(version) = &self.api_version {
            builder = builder.header(VERSION_HEADER, version);
        }
        builder
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value, CrmHttpError> {
        let response = self.http.send(builder).await?;
        let status = response.status();

        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(CrmHttpError::Status { status: status.as_u16(), headers, body });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| CrmHttpError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CrmGateway for CrmClient {
    type Error = CrmHttpError;

    #[instrument(skip_all, fields(path = %self.endpoints.verify_path))]
    async fn verify_credentials(&self, access_token: &str) -> Result<Value, Self::Error> {
        let method = match self.endpoints.verify_method {
            VerifyMethod::Get => Method::GET,
            VerifyMethod::Post => Method::POST,
        };
        let builder = self.request(method, &self.endpoints.verify_path, access_token);
        let body = self.execute(builder).await?;
        debug!("credentials accepted");
        Ok(body)
    }

    #[instrument(skip_all, fields(path = %self.endpoints.leads_path))]
    async fn send_lead(
        &self,
        access_token: &str,
        payload: &CrmPayload,
    ) -> Result<Value, Self::Error> {
        let builder =
            self.request(Method::POST, &self.endpoints.leads_path, access_token).json(payload);
        self.execute(builder).await
    }
}
