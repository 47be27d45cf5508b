//! Traits for OAuth token endpoint operations
//!
//! Abstracts the provider's HTTP endpoints so the token manager can be
//! exercised against in-memory fakes.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::TokenResponse;

/// Trait for OAuth token endpoint operations
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Build the consent page URL carrying `state`
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    /// Returns error if the request fails, is rejected, or cannot be parsed
    async fn exchange_authorization_code(
        &self,
        code: &str,
    ) -> Result<TokenResponse, OAuthClientError>;

    /// Obtain a new access token from a refresh token
    ///
    /// # Errors
    /// Returns error if the request fails, is rejected, or cannot be parsed
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError>;
}
