//! OAuth 2.0 authorization-code infrastructure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  Flow orchestration, sole writer of the session
//! └────────┬────────┘
//!          │
//!          ├──► TokenEndpoint (OAuthClient)   HTTP token grants
//!          │
//!          └──► AuthSession                   caller-owned token store
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use leadsync_common::auth::{AuthSession, OAuthClient, OAuthConfig, TokenManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OAuthConfig::new(
//!     "https://crm.example.com/oauth/authorize".to_string(),
//!     "https://api.crm.example.com/oauth/token".to_string(),
//!     "client_id".to_string(),
//!     "client_secret".to_string(),
//!     "http://localhost:8501/callback".to_string(),
//!     vec!["contacts.write".to_string()],
//! );
//! let manager = TokenManager::new(OAuthClient::new(config));
//! let mut session = AuthSession::new();
//!
//! let url = manager.build_authorization_url(&mut session);
//! println!("Open this URL in your browser: {url}");
//!
//! // ... user authorizes, the redirect carries `code` and `state` ...
//! # let (code, state) = ("code", "state");
//! manager.authenticate(&mut session, code, state).await?;
//!
//! // later, when the CRM answers 401
//! let fresh = manager.refresh_access_token(&mut session).await?;
//! # let _ = fresh;
//! # Ok(())
//! # }
//! ```
//!
//! # Security Features
//!
//! - **State Validation**: CSRF protection with a random alphanumeric state,
//!   compared in constant time
//! - **Fail Closed**: any failed step clears the session's credentials
//! - **Redaction**: tokens and client secrets never appear in `Debug` output

pub mod client;
pub mod session;
pub mod state;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError};
pub use session::AuthSession;
pub use state::{generate_state, validate_state};
pub use token_manager::{AuthError, TokenManager};
pub use traits::TokenEndpoint;
pub use types::{Credentials, OAuthConfig, TokenResponse};
