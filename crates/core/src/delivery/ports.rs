//! Port interfaces for CRM delivery

use async_trait::async_trait;
use leadsync_common::resilience::HttpFailure;
use leadsync_domain::CrmPayload;
use serde_json::Value;

/// Outbound calls the delivery engine makes against the CRM
#[async_trait]
pub trait CrmGateway: Send + Sync + 'static {
    /// Transport error; must expose the HTTP status so 401 and 429 can be
    /// told apart
    type Error: HttpFailure + std::error::Error + Send + Sync + 'static;

    /// Call the identity endpoint with `access_token`
    async fn verify_credentials(&self, access_token: &str) -> Result<Value, Self::Error>;

    /// Create one lead, returning the CRM's JSON reply
    async fn send_lead(
        &self,
        access_token: &str,
        payload: &CrmPayload,
    ) -> Result<Value, Self::Error>;
}
