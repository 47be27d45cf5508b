//! Configuration structures
//!
//! Loaded once at process start by the infrastructure layer (environment,
//! `.env`, or a TOML/JSON file) and handed to the core as plain values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_LEADS_PATH, DEFAULT_SCOPES, DEFAULT_SOURCE_ATTRIBUTION,
    DEFAULT_VERIFY_PATH,
};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub crm: CrmConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// Connection settings for the target CRM
#[derive(Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret (never printed by `Debug`)
    pub client_secret: String,

    /// Redirect URI registered with the CRM app
    pub redirect_uri: String,

    /// Authorization page users are sent to
    pub auth_url: String,

    /// REST API base URL; the token endpoint is `{api_base_url}/oauth/token`
    pub api_base_url: String,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Value of the `Version` header, for CRMs that version their API by
    /// header
    #[serde(default)]
    pub api_version: Option<String>,

    /// Per-request timeout. `None` keeps the transport default.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl CrmConfig {
    /// Token endpoint used by both grant flows
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.api_base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_url", &self.auth_url)
            .field("api_base_url", &self.api_base_url)
            .field("scopes", &self.scopes)
            .field("api_version", &self.api_version)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect()
}

/// HTTP method of the identity endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerifyMethod {
    #[default]
    Get,
    Post,
}

/// CRM resource paths, relative to `api_base_url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub verify_method: VerifyMethod,
    #[serde(default = "default_verify_path")]
    pub verify_path: String,
    #[serde(default = "default_leads_path")]
    pub leads_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            verify_method: VerifyMethod::default(),
            verify_path: default_verify_path(),
            leads_path: default_leads_path(),
        }
    }
}

fn default_verify_path() -> String {
    DEFAULT_VERIFY_PATH.to_string()
}

fn default_leads_path() -> String {
    DEFAULT_LEADS_PATH.to_string()
}

/// Static settings applied to every record of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Tags added to every lead
    #[serde(default)]
    pub tags: Vec<String>,

    /// Also tag each lead with its zip code
    #[serde(default = "default_true")]
    pub add_zip_tags: bool,

    #[serde(default)]
    pub primary_agent: Option<String>,

    #[serde(default)]
    pub listing_agent: Option<String>,

    #[serde(default)]
    pub partner: Option<String>,

    /// Number of records in flight at once (clamped to at least 1)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Source attribution written to the payload and its notes
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            add_zip_tags: true,
            primary_agent: None,
            listing_agent: None,
            partner: None,
            concurrency: DEFAULT_CONCURRENCY,
            source: default_source(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_source() -> String {
    DEFAULT_SOURCE_ATTRIBUTION.to_string()
}
