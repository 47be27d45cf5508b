//! Application context - wires configuration into services

use std::path::PathBuf;

use leadsync_common::auth::{OAuthClient, TokenManager};
use leadsync_domain::{Config, Result};
use leadsync_infra::{config, CrmClient};
use tracing::info;

/// Configuration and the services built from it
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub token_manager: TokenManager<OAuthClient>,
}

impl AppContext {
    /// Load configuration and build the token manager
    ///
    /// An explicit `config_path` wins over the environment and probed files.
    ///
    /// # Errors
    /// `LeadSyncError::Config` when no usable configuration is found.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => config::load_from_file(Some(path))?,
            None => config::load()?,
        };
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        let token_manager = TokenManager::new(OAuthClient::new(config::oauth_config(&config.crm)));
        info!(api = %config.crm.api_base_url, "Application context ready");
        Self { config, token_manager }
    }

    /// Gateway for the configured CRM
    ///
    /// # Errors
    /// `LeadSyncError::Config` when the HTTP client cannot be built.
    pub fn crm_client(&self) -> Result<CrmClient> {
        CrmClient::new(&self.config.crm)
    }
}
