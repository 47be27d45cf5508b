//! Delivery engine - verifies credentials once, then delivers batches of
//! lead records with bounded concurrency and per-record failure isolation

use std::sync::Arc;

use leadsync_common::auth::{AuthError, AuthSession, TokenEndpoint, TokenManager};
use leadsync_common::resilience::{HttpFailure, RateLimitedCaller, RetryError};
use leadsync_domain::{DeliveryConfig, DeliveryOutcome, FailedLead, LeadId, LeadRecord};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use super::ports::CrmGateway;
use crate::transform::RecordTransformer;

const UNAUTHORIZED: u16 = 401;

/// State shared by every delivery task
struct DeliveryContext<G> {
    gateway: G,
    transformer: RecordTransformer,
    caller: RateLimitedCaller,
    access_token: String,
    semaphore: Semaphore,
    failures: Mutex<Vec<FailedLead>>,
}

/// Result of one record task
struct RecordResult {
    outcome: DeliveryOutcome,
    unauthorized: bool,
}

/// Delivers lead records to the CRM.
///
/// An engine only exists with verified credentials: [`DeliveryEngine::connect`]
/// checks the access token (refreshing it once on a 401) before returning.
/// The token is fixed for the engine's lifetime.
pub struct DeliveryEngine<G: CrmGateway> {
    context: Arc<DeliveryContext<G>>,
    concurrency: usize,
}

impl<G: CrmGateway> DeliveryEngine<G> {
    /// Verify the session's credentials and build an engine
    ///
    /// # Errors
    /// [`AuthError::NotAuthenticated`] without an access token,
    /// [`AuthError::Verification`] when the identity call fails, or any
    /// refresh error. The session is invalidated on every error.
    pub async fn connect<C: TokenEndpoint>(
        gateway: G,
        token_manager: &TokenManager<C>,
        session: &mut AuthSession,
        settings: DeliveryConfig,
    ) -> Result<Self, AuthError> {
        let caller = RateLimitedCaller::new();
        Self::connect_with_caller(gateway, caller, token_manager, session, settings).await
    }

    /// [`Self::connect`] with a custom retry wrapper
    ///
    /// # Errors
    /// Same as [`Self::connect`].
    #[instrument(skip_all, fields(concurrency = settings.concurrency))]
    pub async fn connect_with_caller<C: TokenEndpoint>(
        gateway: G,
        caller: RateLimitedCaller,
        token_manager: &TokenManager<C>,
        session: &mut AuthSession,
        settings: DeliveryConfig,
    ) -> Result<Self, AuthError> {
        let Some(token) = session.access_token().map(str::to_string) else {
            error!("Cannot connect delivery engine without an access token");
            token_manager.invalidate(session);
            return Err(AuthError::NotAuthenticated);
        };

        let access_token = match verify(&gateway, &caller, &token).await {
            Ok(()) => token,
            Err(err) if is_unauthorized(&err) => {
                info!("Access token rejected, refreshing once");
                let fresh = match token_manager.refresh_access_token(session).await {
                    Ok(fresh) => fresh,
                    Err(err) => {
                        error!(error = %err, "Token refresh during verification failed");
                        return Err(err);
                    }
                };
                if let Err(err) = verify(&gateway, &caller, &fresh).await {
                    error!(error = %err, "Verification failed after token refresh");
                    token_manager.invalidate(session);
                    return Err(AuthError::Verification(err.to_string()));
                }
                fresh
            }
            Err(err) => {
                error!(error = %err, "Credential verification failed");
                token_manager.invalidate(session);
                return Err(AuthError::Verification(err.to_string()));
            }
        };

        let concurrency = settings.concurrency.max(1);
        info!(concurrency, "Delivery engine connected");

        Ok(Self {
            context: Arc::new(DeliveryContext {
                gateway,
                transformer: RecordTransformer::new(settings),
                caller,
                access_token,
                semaphore: Semaphore::new(concurrency),
                failures: Mutex::new(Vec::new()),
            }),
            concurrency,
        })
    }

    /// Number of records in flight at once
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Snapshot of every failure recorded since construction
    pub fn failed_leads(&self) -> Vec<FailedLead> {
        self.context.failures.lock().clone()
    }

    /// Deliver `records`, returning one outcome per record in input order.
    ///
    /// A failing record never aborts the batch; it is recorded in the
    /// failure list and reported as a `failed` outcome.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn deliver(&self, records: Vec<LeadRecord>) -> Vec<DeliveryOutcome> {
        let mut handles = Vec::with_capacity(records.len());
        for record in records {
            let lead_id = record.identifier();
            let context = Arc::clone(&self.context);
            let task_id = lead_id.clone();
            handles.push((lead_id, tokio::spawn(deliver_one(context, record, task_id))));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        let mut unauthorized = 0usize;
        for (lead_id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => {
                    let error = format!("delivery task aborted: {join_err}");
                    self.context.record_failure(&lead_id, &error);
                    RecordResult {
                        outcome: DeliveryOutcome::Failed { lead_id, error },
                        unauthorized: false,
                    }
                }
            };
            unauthorized += usize::from(result.unauthorized);
            outcomes.push(result.outcome);
        }

        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        let delivered = outcomes.len() - failed;
        if unauthorized > 0 {
            warn!(delivered, failed, unauthorized, "Batch finished with authorization failures");
        } else {
            info!(delivered, failed, "Batch delivered");
        }
        outcomes
    }
}

impl<G> DeliveryContext<G> {
    fn record_failure(&self, lead_id: &LeadId, error: &str) {
        self.failures
            .lock()
            .push(FailedLead { lead_id: lead_id.clone(), error: error.to_string() });
    }
}

async fn deliver_one<G: CrmGateway>(
    context: Arc<DeliveryContext<G>>,
    record: LeadRecord,
    lead_id: LeadId,
) -> RecordResult {
    let Ok(_permit) = context.semaphore.acquire().await else {
        let error = "delivery engine is shutting down".to_string();
        context.record_failure(&lead_id, &error);
        return RecordResult {
            outcome: DeliveryOutcome::Failed { lead_id, error },
            unauthorized: false,
        };
    };

    let payload = match context.transformer.transform(&record) {
        Ok(payload) => payload,
        Err(err) => {
            let error = err.to_string();
            warn!(lead_id = %lead_id, error = %error, "Record could not be transformed");
            context.record_failure(&lead_id, &error);
            return RecordResult {
                outcome: DeliveryOutcome::Failed { lead_id, error },
                unauthorized: false,
            };
        }
    };

    let gateway = &context.gateway;
    let token = context.access_token.as_str();
    let body = &payload;
    match context.caller.call(move || gateway.send_lead(token, body)).await {
        Ok(response) => {
            debug!(lead_id = %lead_id, "Lead delivered");
            RecordResult {
                outcome: DeliveryOutcome::Delivered { lead_id, response },
                unauthorized: false,
            }
        }
        Err(err) => {
            let unauthorized = is_unauthorized(&err);
            let error = err.to_string();
            warn!(lead_id = %lead_id, error = %error, "Lead delivery failed");
            context.record_failure(&lead_id, &error);
            RecordResult { outcome: DeliveryOutcome::Failed { lead_id, error }, unauthorized }
        }
    }
}

async fn verify<G: CrmGateway>(
    gateway: &G,
    caller: &RateLimitedCaller,
    access_token: &str,
) -> Result<(), RetryError<G::Error>> {
    let response: Value = caller.call(move || gateway.verify_credentials(access_token)).await?;
    debug!(response = %response, "Credentials verified");
    Ok(())
}

fn is_unauthorized<E: HttpFailure>(err: &RetryError<E>) -> bool {
    err.inner().and_then(HttpFailure::status) == Some(UNAUTHORIZED)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use leadsync_common::auth::Credentials;
    use leadsync_common::testing::MockTokenEndpoint;
    use leadsync_domain::CrmPayload;
    use serde_json::json;
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    #[error("HTTP {status}")]
    struct FakeError {
        status: u16,
    }

    impl HttpFailure for FakeError {
        fn status(&self) -> Option<u16> {
            Some(self.status)
        }

        fn header(&self, name: &str) -> Option<&str> {
            name.eq_ignore_ascii_case("retry-after").then_some("1")
        }
    }

    /// Accepts every lead unless its first name is in `reject`; verification
    /// answers with the scripted statuses, then succeeds.
    #[derive(Default)]
    struct FakeGateway {
        verify_statuses: Mutex<Vec<u16>>,
        verify_tokens: Mutex<Vec<String>>,
        sent: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        reject: Vec<(&'static str, u16)>,
        panic_on: Option<&'static str>,
    }

    #[async_trait]
    impl CrmGateway for FakeGateway {
        type Error = FakeError;

        async fn verify_credentials(&self, access_token: &str) -> Result<Value, FakeError> {
            self.verify_tokens.lock().push(access_token.to_string());
            let status = {
                let mut statuses = self.verify_statuses.lock();
                if statuses.is_empty() { None } else { Some(statuses.remove(0)) }
            };
            match status {
                Some(status) => Err(FakeError { status }),
                None => Ok(json!({"id": "user-1"})),
            }
        }

        async fn send_lead(
            &self,
            _access_token: &str,
            payload: &CrmPayload,
        ) -> Result<Value, FakeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.sent.fetch_add(1, Ordering::SeqCst);

            let name = payload.info.contact.first_name.clone().unwrap_or_default();
            if self.panic_on == Some(name.as_str()) {
                panic!("gateway exploded on {name}");
            }
            if let Some((_, status)) = self.reject.iter().find(|(n, _)| *n == name) {
                return Err(FakeError { status: *status });
            }
            Ok(json!({"id": format!("lead-{name}")}))
        }
    }

    fn session() -> AuthSession {
        AuthSession::with_credentials(Credentials::new(
            "access-1".to_string(),
            "refresh-1".to_string(),
            None,
        ))
    }

    fn lead(md5: &str, first_name: &str) -> LeadRecord {
        serde_json::from_value(json!({"md5": md5, "first_name": first_name})).unwrap()
    }

    async fn connect(gateway: FakeGateway, concurrency: usize) -> DeliveryEngine<FakeGateway> {
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let settings = DeliveryConfig { concurrency, ..DeliveryConfig::default() };
        DeliveryEngine::connect(gateway, &manager, &mut session(), settings).await.unwrap()
    }

    #[tokio::test]
    async fn malformed_record_fails_alone() {
        let engine = connect(FakeGateway::default(), 1).await;
        let bad: LeadRecord = serde_json::from_value(json!({
            "md5": "m2",
            "first_name": "Bob",
            "phone_2": {"number": "3125550101"}
        }))
        .unwrap();

        let outcomes = engine.deliver(vec![lead("m1", "Ada"), bad, lead("m3", "Cy")]).await;

        assert_eq!(outcomes.len(), 3);
        assert!(!outcomes[0].is_failed());
        assert!(outcomes[1].is_failed());
        assert!(!outcomes[2].is_failed());
        assert_eq!(outcomes[1].lead_id().as_str(), "m2");

        let failed = engine.failed_leads();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].lead_id.as_str(), "m2");
        assert!(failed[0].error.contains("phone_2"));
    }

    #[tokio::test]
    async fn outcomes_follow_input_order_under_concurrency() {
        let engine = connect(FakeGateway::default(), 4).await;
        let records: Vec<LeadRecord> =
            (0..12).map(|i| lead(&format!("m{i}"), &format!("n{i}"))).collect();

        let outcomes = engine.deliver(records).await;

        let ids: Vec<&str> = outcomes.iter().map(|o| o.lead_id().as_str()).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("m{i}")).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
        match &outcomes[5] {
            DeliveryOutcome::Delivered { response, .. } => assert_eq!(response["id"], "lead-n5"),
            DeliveryOutcome::Failed { error, .. } => panic!("unexpected failure: {error}"),
        }
    }

    #[tokio::test]
    async fn concurrency_limit_is_respected() {
        let engine = connect(FakeGateway::default(), 3).await;
        let records: Vec<LeadRecord> =
            (0..10).map(|i| lead(&format!("m{i}"), &format!("n{i}"))).collect();

        engine.deliver(records).await;

        let gateway = &engine.context.gateway;
        assert_eq!(gateway.sent.load(Ordering::SeqCst), 10);
        assert!(gateway.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped() {
        let engine = connect(FakeGateway::default(), 0).await;
        assert_eq!(engine.concurrency(), 1);
        assert_eq!(engine.deliver(vec![lead("m1", "Ada")]).await.len(), 1);
    }

    #[tokio::test]
    async fn send_failures_accumulate_across_batches() {
        let gateway = FakeGateway { reject: vec![("Bob", 422)], ..FakeGateway::default() };
        let engine = connect(gateway, 2).await;

        engine.deliver(vec![lead("m1", "Bob")]).await;
        let outcomes = engine.deliver(vec![lead("m2", "Ada"), lead("m3", "Bob")]).await;

        assert_eq!(outcomes[1].error(), Some("HTTP 422"));
        let failed: Vec<String> =
            engine.failed_leads().into_iter().map(|f| f.lead_id.to_string()).collect();
        assert_eq!(failed, vec!["m1".to_string(), "m3".to_string()]);
    }

    #[tokio::test]
    async fn panicking_task_is_recorded_as_failure() {
        let gateway = FakeGateway { panic_on: Some("Bob"), ..FakeGateway::default() };
        let engine = connect(gateway, 2).await;

        let outcomes = engine.deliver(vec![lead("m1", "Ada"), lead("m2", "Bob")]).await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].is_failed());
        assert!(outcomes[1].error().unwrap().starts_with("delivery task aborted"));
        assert_eq!(engine.failed_leads()[0].lead_id.as_str(), "m2");
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_throttling_becomes_a_record_failure() {
        let gateway = FakeGateway { reject: vec![("Bob", 429)], ..FakeGateway::default() };
        let engine = connect(gateway, 1).await;

        let outcomes = engine.deliver(vec![lead("m1", "Bob"), lead("m2", "Ada")]).await;

        assert_eq!(outcomes[0].error(), Some("Max retries (10) exceeded due to rate limiting"));
        assert!(!outcomes[1].is_failed());
        assert_eq!(engine.context.gateway.sent.load(Ordering::SeqCst), 11);
    }

    #[tokio::test]
    async fn unauthorized_verification_refreshes_once() {
        let gateway = FakeGateway { verify_statuses: Mutex::new(vec![401]), ..Default::default() };
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let mut session = session();

        let engine =
            DeliveryEngine::connect(gateway, &manager, &mut session, DeliveryConfig::default())
                .await
                .unwrap();

        assert_eq!(manager.endpoint().refresh_calls(), 1);
        assert_eq!(session.access_token(), Some("refreshed_access_token"));
        assert_eq!(
            *engine.context.gateway.verify_tokens.lock(),
            vec!["access-1".to_string(), "refreshed_access_token".to_string()]
        );
        assert_eq!(engine.context.access_token, "refreshed_access_token");
    }

    #[tokio::test]
    async fn second_unauthorized_fails_construction() {
        let gateway =
            FakeGateway { verify_statuses: Mutex::new(vec![401, 401]), ..Default::default() };
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let mut session = session();

        let result =
            DeliveryEngine::connect(gateway, &manager, &mut session, DeliveryConfig::default())
                .await;

        assert!(matches!(result, Err(AuthError::Verification(_))));
        assert_eq!(manager.endpoint().refresh_calls(), 1);
        assert!(session.credentials().is_none());
    }

    #[tokio::test]
    async fn other_verification_errors_do_not_refresh() {
        let gateway = FakeGateway { verify_statuses: Mutex::new(vec![500]), ..Default::default() };
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let mut session = session();

        let result =
            DeliveryEngine::connect(gateway, &manager, &mut session, DeliveryConfig::default())
                .await;

        assert!(matches!(result, Err(AuthError::Verification(_))));
        assert_eq!(manager.endpoint().refresh_calls(), 0);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn missing_access_token_is_rejected() {
        let manager = TokenManager::new(MockTokenEndpoint::new());
        let mut session = AuthSession::new();

        let result = DeliveryEngine::connect(
            FakeGateway::default(),
            &manager,
            &mut session,
            DeliveryConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }
}
