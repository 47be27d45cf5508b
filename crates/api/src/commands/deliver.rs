//! `leadsync deliver`

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use leadsync_common::auth::{AuthSession, Credentials, TokenEndpoint, TokenManager};
use leadsync_core::{CrmGateway, DeliveryEngine};
use leadsync_domain::{DeliveryConfig, DeliveryOutcome, FailedLead, LeadRecord};
use serde::Serialize;
use tracing::{info, warn};

/// Everything a delivery run produced
#[derive(Debug)]
pub struct DeliveryReport {
    /// One entry per input record, in input order
    pub outcomes: Vec<DeliveryOutcome>,
    pub failures: Vec<FailedLead>,
    /// Set when the access token was refreshed while connecting
    pub refreshed: Option<Credentials>,
}

/// Read a JSON array of lead records
///
/// # Errors
/// When the file cannot be opened or is not a JSON array of objects.
pub fn read_leads(path: &Path) -> Result<Vec<LeadRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing lead records from {}", path.display()))
}

/// Write `value` as pretty JSON to `path`
///
/// # Errors
/// On any filesystem or serialization failure.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush().with_context(|| format!("writing {}", path.display()))
}

/// Connect a delivery engine with `credentials` and deliver `records`
///
/// Per-record failures are part of the report, not errors.
///
/// # Errors
/// When the engine cannot be connected (verification or refresh failed).
pub async fn deliver<G, C>(
    gateway: G,
    manager: &TokenManager<C>,
    credentials: Credentials,
    settings: DeliveryConfig,
    records: Vec<LeadRecord>,
) -> Result<DeliveryReport>
where
    G: CrmGateway,
    C: TokenEndpoint,
{
    let mut session = AuthSession::with_credentials(credentials.clone());
    let engine = DeliveryEngine::connect(gateway, manager, &mut session, settings)
        .await
        .context("could not verify CRM credentials")?;

    let total = records.len();
    let outcomes = engine.deliver(records).await;
    let failures = engine.failed_leads();
    if failures.is_empty() {
        info!(total, "All records delivered");
    } else {
        warn!(total, failed = failures.len(), "Some records were not delivered");
    }

    let refreshed = session.credentials().filter(|current| **current != credentials).cloned();
    Ok(DeliveryReport { outcomes, failures, refreshed })
}
