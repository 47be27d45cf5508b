//! Per-user authentication state
//!
//! An [`AuthSession`] is owned by the caller and lent by `&mut` to the
//! [`TokenManager`](super::TokenManager), which is the only code that writes
//! it.

use super::types::Credentials;

/// Credentials, pending CSRF state and the authenticated flag
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    credentials: Option<Credentials>,
    pending_state: Option<String>,
    authenticated: bool,
}

impl AuthSession {
    /// Empty, unauthenticated session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with tokens obtained earlier (e.g. from the CLI or a
    /// previous run)
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        let authenticated = !credentials.access_token.is_empty();
        Self { credentials: Some(credentials), pending_state: None, authenticated }
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.access_token.as_str()).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.refresh_token.as_str()).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn location_id(&self) -> Option<&str> {
        self.credentials.as_ref().and_then(|c| c.location_id.as_deref())
    }

    #[must_use]
    pub fn pending_state(&self) -> Option<&str> {
        self.pending_state.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub(super) fn set_pending_state(&mut self, state: String) {
        self.pending_state = Some(state);
    }

    pub(super) fn store_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
        self.pending_state = None;
        self.authenticated = true;
    }

    /// Replace the access token, and the refresh token only when a new one is
    /// supplied
    pub(super) fn update_tokens(&mut self, access_token: String, refresh_token: Option<String>) {
        match self.credentials.as_mut() {
            Some(creds) => {
                creds.access_token = access_token;
                if let Some(refresh_token) = refresh_token {
                    creds.refresh_token = refresh_token;
                }
            }
            None => {
                self.credentials = Some(Credentials::new(
                    access_token,
                    refresh_token.unwrap_or_default(),
                    None,
                ));
            }
        }
        self.authenticated = true;
    }

    pub(super) fn reset(&mut self) {
        *self = Self::default();
    }
}
