//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::{OAuthClientError, TokenEndpoint, TokenResponse};

type ScriptedResponses = Arc<Mutex<VecDeque<Result<TokenResponse, OAuthClientError>>>>;
type CallLog = Arc<Mutex<Vec<String>>>;

/// Scripted token endpoint
///
/// Responses are queued per grant and consumed in order. When a queue is
/// empty the endpoint answers with a fixed successful token pair.
///
/// # Examples
///
/// ```
/// use leadsync_common::auth::{AuthSession, TokenManager};
/// use leadsync_common::testing::MockTokenEndpoint;
///
/// let manager = TokenManager::new(MockTokenEndpoint::new());
/// let mut session = AuthSession::new();
/// let url = manager.build_authorization_url(&mut session);
/// assert!(url.starts_with("https://mock.crm.test/oauth/authorize?"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTokenEndpoint {
    exchange_responses: ScriptedResponses,
    refresh_responses: ScriptedResponses,
    exchanged_codes: CallLog,
    refreshed_tokens: CallLog,
}

impl MockTokenEndpoint {
    /// Create a new mock endpoint with empty scripts
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next authorization-code exchange result
    pub fn push_exchange(&self, response: Result<TokenResponse, OAuthClientError>) {
        // SAFETY: Mutex poisoning is acceptable in test mocks - if a test panics,
        // the entire test fails anyway
        self.exchange_responses.lock().unwrap().push_back(response);
    }

    /// Queue the next refresh result
    pub fn push_refresh(&self, response: Result<TokenResponse, OAuthClientError>) {
        self.refresh_responses.lock().unwrap().push_back(response);
    }

    /// Codes passed to the exchange grant, in call order
    #[must_use]
    pub fn exchanged_codes(&self) -> Vec<String> {
        self.exchanged_codes.lock().unwrap().clone()
    }

    /// Refresh tokens presented, in call order
    #[must_use]
    pub fn refreshed_tokens(&self) -> Vec<String> {
        self.refreshed_tokens.lock().unwrap().clone()
    }

    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        self.exchanged_codes.lock().unwrap().len()
    }

    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refreshed_tokens.lock().unwrap().len()
    }

    fn default_tokens(access: &str, refresh: &str) -> TokenResponse {
        TokenResponse {
            access_token: Some(access.to_string()),
            refresh_token: Some(refresh.to_string()),
            location_id: Some("mock_location".to_string()),
        }
    }
}

#[async_trait]
impl TokenEndpoint for MockTokenEndpoint {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://mock.crm.test/oauth/authorize?client_id=test&state={state}")
    }

    async fn exchange_authorization_code(
        &self,
        code: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        self.exchange_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Self::default_tokens("mock_access_token", "mock_refresh_token")))
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refreshed_tokens.lock().unwrap().push(refresh_token.to_string());
        self.refresh_responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(Self::default_tokens("refreshed_access_token", "refreshed_refresh_token"))
        })
    }
}
