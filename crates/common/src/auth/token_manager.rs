//! Token manager for the authorization-code and refresh flows
//!
//! Manages the OAuth token lifecycle on behalf of an [`AuthSession`]:
//! - Authorization URL generation with a fresh CSRF state
//! - Callback state verification
//! - Code exchange and credential storage
//! - Access token refresh
//!
//! Every failing operation resets the session, so a caller never holds
//! half-valid credentials after an error.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::client::OAuthClientError;
use super::session::AuthSession;
use super::state::{generate_state, validate_state};
use super::traits::TokenEndpoint;
use super::types::Credentials;

/// Error type for token manager operations
#[derive(Debug, Error)]
pub enum AuthError {
    /// Callback `state` did not match the pending one (or none was pending)
    #[error("Invalid state parameter: possible CSRF attack")]
    StateMismatch,

    /// Token endpoint answered without the tokens we need
    #[error("Token response is missing access or refresh token")]
    MissingTokens,

    /// Refresh requested without a refresh token on hand
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Operation requires an access token
    #[error("Not authenticated (no access token)")]
    NotAuthenticated,

    /// Authorization code exchange failed
    #[error("Authorization code exchange failed: {0}")]
    Exchange(#[source] OAuthClientError),

    /// Token endpoint refused the refresh request
    #[error("Token refresh failed: {0}")]
    RefreshRejected(#[source] OAuthClientError),

    /// Credentials could not be verified against the CRM
    #[error("Credential verification failed: {0}")]
    Verification(String),
}

/// Drives the OAuth flows against a [`TokenEndpoint`]
#[derive(Debug, Clone)]
pub struct TokenManager<C> {
    endpoint: C,
}

impl<C: TokenEndpoint> TokenManager<C> {
    #[must_use]
    pub fn new(endpoint: C) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &C {
        &self.endpoint
    }

    /// Generate a fresh state, remember it in `session`, and return the
    /// consent page URL
    pub fn build_authorization_url(&self, session: &mut AuthSession) -> String {
        let state = generate_state();
        let url = self.endpoint.authorization_url(&state);
        session.set_pending_state(state);
        debug!("Authorization URL generated");
        url
    }

    /// Check the `state` returned on the redirect against the pending one
    ///
    /// # Errors
    /// [`AuthError::StateMismatch`] when no state is pending or it differs;
    /// the session is reset.
    pub fn verify_callback_state(
        &self,
        session: &mut AuthSession,
        state: &str,
    ) -> Result<(), AuthError> {
        let matches =
            session.pending_state().is_some_and(|expected| validate_state(expected, state));
        if matches {
            Ok(())
        } else {
            warn!("OAuth callback state mismatch");
            session.reset();
            Err(AuthError::StateMismatch)
        }
    }

    /// Verify `state`, then exchange `code`
    ///
    /// # Errors
    /// Any error of [`Self::verify_callback_state`] or
    /// [`Self::exchange_code_for_token`]. A state mismatch never reaches the
    /// token endpoint.
    pub async fn authenticate(
        &self,
        session: &mut AuthSession,
        code: &str,
        state: &str,
    ) -> Result<(), AuthError> {
        self.verify_callback_state(session, state)?;
        self.exchange_code_for_token(session, code).await
    }

    /// Exchange an authorization code and store the issued credentials
    ///
    /// # Errors
    /// [`AuthError::Exchange`] when the request fails and
    /// [`AuthError::MissingTokens`] when either token is absent. The session
    /// is reset on every error.
    #[instrument(skip_all)]
    pub async fn exchange_code_for_token(
        &self,
        session: &mut AuthSession,
        code: &str,
    ) -> Result<(), AuthError> {
        let response = match self.endpoint.exchange_authorization_code(code).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Authorization code exchange failed");
                session.reset();
                return Err(AuthError::Exchange(err));
            }
        };

        let (Some(access_token), Some(refresh_token)) =
            (response.access_token(), response.refresh_token())
        else {
            warn!("Token response did not include both tokens");
            session.reset();
            return Err(AuthError::MissingTokens);
        };

        session.store_credentials(Credentials::new(
            access_token.to_string(),
            refresh_token.to_string(),
            response.location_id.clone(),
        ));
        info!(location_id = ?session.location_id(), "Stored OAuth credentials");
        Ok(())
    }

    /// Obtain a new access token with the session's refresh token
    ///
    /// The refresh token is replaced only when the endpoint issues a new one.
    ///
    /// # Errors
    /// [`AuthError::NoRefreshToken`] without a request when none is stored,
    /// [`AuthError::RefreshRejected`] when the request fails, and
    /// [`AuthError::MissingTokens`] when no access token comes back. The
    /// session is reset on every error.
    #[instrument(skip_all)]
    pub async fn refresh_access_token(
        &self,
        session: &mut AuthSession,
    ) -> Result<String, AuthError> {
        let Some(refresh_token) = session.refresh_token().map(str::to_string) else {
            warn!("Refresh requested without a refresh token");
            session.reset();
            return Err(AuthError::NoRefreshToken);
        };

        let response = match self.endpoint.refresh_access_token(&refresh_token).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                session.reset();
                return Err(AuthError::RefreshRejected(err));
            }
        };

        let Some(access_token) = response.access_token().map(str::to_string) else {
            warn!("Refresh response did not include an access token");
            session.reset();
            return Err(AuthError::MissingTokens);
        };

        session.update_tokens(access_token.clone(), response.refresh_token().map(str::to_string));
        info!("Access token refreshed");
        Ok(access_token)
    }

    /// Drop all credentials held by `session`
    pub fn invalidate(&self, session: &mut AuthSession) {
        debug!("Invalidating session");
        session.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenResponse;
    use crate::testing::MockTokenEndpoint;

    fn tokens(access: &str, refresh: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: Some(access.to_string()),
            refresh_token: refresh.map(str::to_string),
            location_id: Some("loc-1".to_string()),
        }
    }

    fn seeded() -> AuthSession {
        AuthSession::with_credentials(Credentials::new(
            "old-access".to_string(),
            "old-refresh".to_string(),
            Some("loc-1".to_string()),
        ))
    }

    #[test]
    fn build_authorization_url_stores_pending_state() {
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let mut session = AuthSession::new();

        let url = manager.build_authorization_url(&mut session);
        let state = session.pending_state().unwrap().to_string();

        assert_eq!(state.len(), 32);
        assert!(url.ends_with(&format!("state={state}")));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn authenticate_stores_credentials() {
        let endpoint = MockTokenEndpoint::new();
        endpoint.push_exchange(Ok(tokens("access-1", Some("refresh-1"))));
        let manager = TokenManager::new(endpoint);
        let mut session = AuthSession::new();
        manager.build_authorization_url(&mut session);
        let state = session.pending_state().unwrap().to_string();

        manager.authenticate(&mut session, "code-1", &state).await.unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.access_token(), Some("access-1"));
        assert_eq!(session.refresh_token(), Some("refresh-1"));
        assert_eq!(session.location_id(), Some("loc-1"));
        assert!(session.pending_state().is_none());
        assert_eq!(manager.endpoint().exchanged_codes(), vec!["code-1".to_string()]);
    }

    #[tokio::test]
    async fn state_mismatch_never_calls_token_endpoint() {
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let mut session = AuthSession::new();
        manager.build_authorization_url(&mut session);

        let err = manager.authenticate(&mut session, "code", "forged").await.unwrap_err();

        assert!(matches!(err, AuthError::StateMismatch));
        assert!(session.pending_state().is_none());
        assert_eq!(manager.endpoint().exchange_calls(), 0);
    }

    #[test]
    fn verify_without_pending_state_fails() {
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let mut session = AuthSession::new();
        let err = manager.verify_callback_state(&mut session, "anything").unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch));
    }

    #[tokio::test]
    async fn exchange_without_refresh_token_resets_session() {
        let endpoint = MockTokenEndpoint::new();
        endpoint.push_exchange(Ok(tokens("access-1", None)));
        let manager = TokenManager::new(endpoint);
        let mut session = seeded();

        let err = manager.exchange_code_for_token(&mut session, "code").await.unwrap_err();

        assert!(matches!(err, AuthError::MissingTokens));
        assert!(session.credentials().is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn exchange_rejection_resets_session() {
        let endpoint = MockTokenEndpoint::new();
        endpoint.push_exchange(Err(OAuthClientError::Rejected {
            status: 400,
            body: "invalid_grant".to_string(),
        }));
        let manager = TokenManager::new(endpoint);
        let mut session = seeded();

        let err = manager.exchange_code_for_token(&mut session, "code").await.unwrap_err();

        assert!(matches!(err, AuthError::Exchange(_)));
        assert!(session.credentials().is_none());
    }

    #[tokio::test]
    async fn refresh_keeps_previous_refresh_token_when_omitted() {
        let endpoint = MockTokenEndpoint::new();
        endpoint.push_refresh(Ok(tokens("new-access", None)));
        let manager = TokenManager::new(endpoint);
        let mut session = seeded();

        let access = manager.refresh_access_token(&mut session).await.unwrap();

        assert_eq!(access, "new-access");
        assert_eq!(session.access_token(), Some("new-access"));
        assert_eq!(session.refresh_token(), Some("old-refresh"));
        assert_eq!(manager.endpoint().refreshed_tokens(), vec!["old-refresh".to_string()]);
    }

    #[tokio::test]
    async fn refresh_replaces_rotated_refresh_token() {
        let endpoint = MockTokenEndpoint::new();
        endpoint.push_refresh(Ok(tokens("new-access", Some("new-refresh"))));
        let manager = TokenManager::new(endpoint);
        let mut session = seeded();

        manager.refresh_access_token(&mut session).await.unwrap();

        assert_eq!(session.refresh_token(), Some("new-refresh"));
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_fast() {
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let mut session = AuthSession::new();

        let err = manager.refresh_access_token(&mut session).await.unwrap_err();

        assert!(matches!(err, AuthError::NoRefreshToken));
        assert_eq!(manager.endpoint().refresh_calls(), 0);
    }

    #[tokio::test]
    async fn refresh_rejection_resets_session() {
        let endpoint = MockTokenEndpoint::new();
        endpoint.push_refresh(Err(OAuthClientError::Rejected {
            status: 401,
            body: "revoked".to_string(),
        }));
        let manager = TokenManager::new(endpoint);
        let mut session = seeded();

        let err = manager.refresh_access_token(&mut session).await.unwrap_err();

        assert!(matches!(err, AuthError::RefreshRejected(_)));
        assert!(session.credentials().is_none());
    }

    #[tokio::test]
    async fn refresh_without_access_token_resets_session() {
        let endpoint = MockTokenEndpoint::new();
        endpoint.push_refresh(Ok(TokenResponse::default()));
        let manager = TokenManager::new(endpoint);
        let mut session = seeded();

        let err = manager.refresh_access_token(&mut session).await.unwrap_err();

        assert!(matches!(err, AuthError::MissingTokens));
        assert!(!session.is_authenticated());
    }
}
