//! In-memory CRM implementing the `CrmGateway` port

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use leadsync_common::resilience::HttpFailure;
use leadsync_core::CrmGateway;
use leadsync_domain::CrmPayload;
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Error returned by [`RecordingGateway`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP {status}")]
pub struct GatewayError {
    pub status: u16,
    pub retry_after: Option<String>,
}

impl GatewayError {
    pub fn with_status(status: u16) -> Self {
        Self { status, retry_after: None }
    }

    pub fn throttled(seconds: u64) -> Self {
        Self { status: 429, retry_after: Some(seconds.to_string()) }
    }
}

impl HttpFailure for GatewayError {
    fn status(&self) -> Option<u16> {
        Some(self.status)
    }

    fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("retry-after") {
            self.retry_after.as_deref()
        } else {
            None
        }
    }
}

/// Records every call and answers from scripted queues.
///
/// Clones share state, so a test can keep a handle after moving one into
/// the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    verify_script: Arc<Mutex<VecDeque<GatewayError>>>,
    send_script: Arc<Mutex<VecDeque<GatewayError>>>,
    verify_tokens: Arc<Mutex<Vec<String>>>,
    sent: Arc<Mutex<Vec<(String, CrmPayload)>>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next verification call with `error`.
    pub fn fail_verify(&self, error: GatewayError) {
        self.verify_script.lock().push_back(error);
    }

    /// Fail the next send call with `error`.
    pub fn fail_send(&self, error: GatewayError) {
        self.send_script.lock().push_back(error);
    }

    pub fn verify_tokens(&self) -> Vec<String> {
        self.verify_tokens.lock().clone()
    }

    /// `(access_token, payload)` of every send attempt, in call order.
    pub fn sent(&self) -> Vec<(String, CrmPayload)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl CrmGateway for RecordingGateway {
    type Error = GatewayError;

    async fn verify_credentials(&self, access_token: &str) -> Result<Value, GatewayError> {
        self.verify_tokens.lock().push(access_token.to_string());
        match self.verify_script.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(json!({"id": "user-1", "email": "agent@example.com"})),
        }
    }

    async fn send_lead(
        &self,
        access_token: &str,
        payload: &CrmPayload,
    ) -> Result<Value, GatewayError> {
        self.sent.lock().push((access_token.to_string(), payload.clone()));
        match self.send_script.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(json!({"lead": {"id": format!("crm-{}", self.sent.lock().len())}})),
        }
    }
}
