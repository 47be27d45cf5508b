//! OAuth 2.0 types and structures
//!
//! Configuration for the authorization-code flow, the credentials a CRM
//! issues, and the raw token endpoint response. Every type that holds a
//! secret redacts it in `Debug`.

use std::fmt;

use serde::{Deserialize, Serialize};

const REDACTED: &str = "[REDACTED]";

/// OAuth provider configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Page the user is redirected to for consent
    pub authorization_url: String,

    /// Endpoint for both the code and refresh grants
    pub token_url: String,

    pub client_id: String,

    pub client_secret: String,

    /// Must match the URI registered with the provider
    pub redirect_uri: String,

    pub scopes: Vec<String>,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(
        authorization_url: String,
        token_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        scopes: Vec<String>,
    ) -> Self {
        Self { authorization_url, token_url, client_id, client_secret, redirect_uri, scopes }
    }

    /// Scopes joined with spaces, as the `scope` parameter expects
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("authorization_url", &self.authorization_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Tokens issued for one CRM account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,

    pub refresh_token: String,

    /// Account / sub-account the tokens are scoped to, if the CRM reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl Credentials {
    #[must_use]
    pub fn new(access_token: String, refresh_token: String, location_id: Option<String>) -> Self {
        Self { access_token, refresh_token, location_id }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &REDACTED)
            .field("refresh_token", &REDACTED)
            .field("location_id", &self.location_id)
            .finish()
    }
}

/// Token endpoint response
///
/// Every field is optional: providers differ in what they return, and the
/// token manager decides which absences are fatal.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default, alias = "locationId")]
    pub location_id: Option<String>,
}

impl TokenResponse {
    /// Access token, treating an empty string as absent
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        non_empty(self.access_token.as_deref())
    }

    /// Refresh token, treating an empty string as absent
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(self.refresh_token.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &self.access_token.as_ref().map(|_| REDACTED))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("location_id", &self.location_id)
            .finish()
    }
}
