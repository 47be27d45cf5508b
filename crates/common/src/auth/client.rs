//! OAuth 2.0 client for the authorization-code and refresh-token grants
//!
//! Handles the HTTP side of the flow:
//! - Authorization URL building
//! - Authorization code exchange
//! - Token refresh
//!
//! The client is stateless; the pending `state` and the issued tokens live in
//! an [`AuthSession`](super::AuthSession) managed by the
//! [`TokenManager`](super::TokenManager).

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::traits::TokenEndpoint;
use super::types::{OAuthConfig, TokenResponse};

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Token endpoint answered with a non-success status
    #[error("Token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Failed to parse response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl OAuthClientError {
    /// HTTP status of a rejected request
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::RequestFailed(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// OAuth 2.0 client backed by `reqwest`
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Examples
    /// ```
    /// use leadsync_common::auth::{OAuthClient, OAuthConfig};
    ///
    /// let config = OAuthConfig::new(
    ///     "https://crm.example.com/oauth/authorize".to_string(),
    ///     "https://api.crm.example.com/oauth/token".to_string(),
    ///     "client_id".to_string(),
    ///     "client_secret".to_string(),
    ///     "http://localhost:8501/callback".to_string(),
    ///     vec!["contacts.write".to_string()],
    /// );
    /// let client = OAuthClient::new(config);
    /// ```
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    /// Build with a caller-provided `reqwest` client
    #[must_use]
    pub fn with_http_client(config: OAuthConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the consent page URL carrying `state`
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let params = [
            ("response_type", "code".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("scope", self.config.scope_string()),
            ("state", state.to_string()),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.config.authorization_url, query_string)
    }

    /// Exchange authorization code for tokens
    ///
    /// # Errors
    /// Returns error if the request fails, the endpoint rejects the code, or
    /// the response body is not JSON
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        if code.is_empty() {
            return Err(OAuthClientError::ConfigError("authorization code is empty".to_string()));
        }

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.post_token_form(&form).await
    }

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// Returns error if the request fails, the endpoint rejects the token, or
    /// the response body is not JSON
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        self.post_token_form(&form).await
    }

    async fn post_token_form(
        &self,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, OAuthClientError> {
        debug!(token_url = %self.config.token_url, "Posting token request");
        let response = self.client.post(&self.config.token_url).form(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthClientError::Rejected { status: status.as_u16(), body });
        }

        response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TokenEndpoint for OAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        self.authorization_url(state)
    }

    async fn exchange_authorization_code(
        &self,
        code: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.exchange_authorization_code(code).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_access_token(refresh_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig::new(
            "https://crm.example.com/oauth/chooselocation".to_string(),
            "https://api.crm.example.com/oauth/token".to_string(),
            "client-1".to_string(),
            "secret".to_string(),
            "http://localhost:8501/".to_string(),
            vec!["contacts.write".to_string(), "locations.readonly".to_string()],
        )
    }

    #[test]
    fn authorization_url_encodes_parameters() {
        let client = OAuthClient::new(config());
        let url = client.authorization_url("abcDEF123");

        assert!(url.starts_with("https://crm.example.com/oauth/chooselocation?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8501%2F"));
        assert!(url.contains("scope=contacts.write%20locations.readonly"));
        assert!(url.ends_with("state=abcDEF123"));
    }

    #[tokio::test]
    async fn empty_code_is_rejected_locally() {
        let client = OAuthClient::new(config());
        let err = client.exchange_authorization_code("").await.unwrap_err();
        assert!(matches!(err, OAuthClientError::ConfigError(_)));
    }

    #[test]
    fn rejected_error_exposes_status() {
        let err = OAuthClientError::Rejected { status: 400, body: "invalid_grant".to_string() };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Token endpoint returned 400: invalid_grant");
    }
}
