//! LeadSync - lead export to CRM delivery
//!
//! Main entry point for the `leadsync` command-line tool.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use leadsync_common::auth::Credentials;
use leadsync_infra::observability::init_tracing;
use leadsync_lib::commands::{self, deliver::write_json};
use leadsync_lib::{AppContext, Cli, Command, DeliverArgs};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let ctx = AppContext::new(cli.config).map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        err
    })?;

    match cli.command {
        Command::Authorize => {
            let stdin = io::stdin();
            commands::authorize(&ctx.token_manager, stdin.lock(), io::stdout()).await?;
        }
        Command::Deliver(args) => run_deliver(&ctx, args).await?,
    }

    Ok(())
}

async fn run_deliver(ctx: &AppContext, args: DeliverArgs) -> Result<()> {
    let records = commands::read_leads(&args.input)?;

    let mut settings = ctx.config.delivery.clone();
    if let Some(concurrency) = args.concurrency {
        settings.concurrency = concurrency;
    }

    let gateway = ctx.crm_client().context("building CRM client")?;
    let credentials = Credentials::new(args.access_token, args.refresh_token, args.location_id);
    let report =
        commands::deliver(gateway, &ctx.token_manager, credentials, settings, records).await?;

    match &args.output {
        Some(path) => write_json(path, &report.outcomes)?,
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report.outcomes)?;
            writeln!(stdout)?;
        }
    }

    if let Some(path) = &args.failures {
        write_json(path, &report.failures)?;
    }

    // stdout is reserved for outcomes
    if let Some(refreshed) = &report.refreshed {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "Access token was refreshed; store these credentials:")?;
        serde_json::to_writer_pretty(&mut stderr, refreshed)?;
        writeln!(stderr)?;
    }

    Ok(())
}
