//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads `.env` from the working directory (if present) into the process
//!    environment
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `LEADSYNC_CLIENT_ID`: OAuth client ID
//! - `LEADSYNC_CLIENT_SECRET`: OAuth client secret
//! - `LEADSYNC_REDIRECT_URI`: Redirect URI registered with the CRM app
//! - `LEADSYNC_AUTH_URL`: Authorization page
//! - `LEADSYNC_API_URL`: REST API base URL
//!
//! Optional:
//! - `LEADSYNC_SCOPES`: Space or comma separated scopes
//! - `LEADSYNC_API_VERSION`: Value of the `Version` header
//! - `LEADSYNC_HTTP_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `LEADSYNC_TAGS`: Comma separated tags added to every lead
//! - `LEADSYNC_ADD_ZIP_TAGS`: Whether to tag leads with their zip code
//! - `LEADSYNC_PRIMARY_AGENT`, `LEADSYNC_LISTING_AGENT`, `LEADSYNC_PARTNER`:
//!   Agent IDs
//! - `LEADSYNC_CONCURRENCY`: Records delivered concurrently
//! - `LEADSYNC_SOURCE`: Source attribution
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./leadsync.toml`, `./leadsync.json`, `./config.toml` or
//!    `./config.json` (current working directory)
//! 2. The same names in the parent and grandparent directories
//! 3. Relative to executable location

use std::path::{Path, PathBuf};

use leadsync_common::auth::OAuthConfig;
use leadsync_domain::{Config, CrmConfig, DeliveryConfig, EndpointConfig, LeadSyncError, Result};

const CONFIG_FILE_NAMES: &[&str] =
    &["leadsync.toml", "leadsync.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables (after reading `.env`).
/// If any required variables are missing, falls back to loading from a
/// config file.
///
/// # Errors
/// Returns `LeadSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `LeadSyncError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let crm = CrmConfig {
        client_id: env_var("LEADSYNC_CLIENT_ID")?,
        client_secret: env_var("LEADSYNC_CLIENT_SECRET")?,
        redirect_uri: env_var("LEADSYNC_REDIRECT_URI")?,
        auth_url: env_var("LEADSYNC_AUTH_URL")?,
        api_base_url: env_var("LEADSYNC_API_URL")?,
        scopes: env_opt("LEADSYNC_SCOPES")
            .map_or_else(default_crm_scopes, |raw| split_list(&raw)),
        api_version: env_opt("LEADSYNC_API_VERSION"),
        http_timeout_secs: env_parse("LEADSYNC_HTTP_TIMEOUT_SECS")?,
        endpoints: EndpointConfig::default(),
    };

    let defaults = DeliveryConfig::default();
    let delivery = DeliveryConfig {
        tags: env_opt("LEADSYNC_TAGS").map(|raw| split_list(&raw)).unwrap_or_default(),
        add_zip_tags: env_bool("LEADSYNC_ADD_ZIP_TAGS", defaults.add_zip_tags),
        primary_agent: env_opt("LEADSYNC_PRIMARY_AGENT"),
        listing_agent: env_opt("LEADSYNC_LISTING_AGENT"),
        partner: env_opt("LEADSYNC_PARTNER"),
        concurrency: env_parse("LEADSYNC_CONCURRENCY")?.unwrap_or(defaults.concurrency),
        source: env_opt("LEADSYNC_SOURCE").unwrap_or(defaults.source),
    };

    Ok(Config { crm, delivery })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `LeadSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LeadSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LeadSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LeadSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Connection settings the token manager needs, derived from `crm`
pub fn oauth_config(crm: &CrmConfig) -> OAuthConfig {
    OAuthConfig::new(
        crm.auth_url.clone(),
        crm.token_url(),
        crm.client_id.clone(),
        crm.client_secret.clone(),
        crm.redirect_uri.clone(),
        crm.scopes.clone(),
    )
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `LeadSyncError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LeadSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LeadSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(LeadSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent and grandparent, then
/// the executable's directory and its parents.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    probe_from(&roots)
}

fn probe_from(roots: &[PathBuf]) -> Option<PathBuf> {
    roots
        .iter()
        .flat_map(|root| [root.clone(), root.join(".."), root.join("../..")])
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `LeadSyncError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        LeadSyncError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Optional environment variable; blank counts as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| LeadSyncError::Config(format!("Invalid {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_crm_scopes() -> Vec<String> {
    leadsync_domain::constants::DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect()
}
