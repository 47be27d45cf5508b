//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Deliver enriched lead exports to a CRM
#[derive(Parser, Debug)]
#[command(name = "leadsync", version)]
pub struct Cli {
    /// Configuration file (TOML or JSON). Without it, settings come from the
    /// environment or a probed `leadsync.toml`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the OAuth authorization-code flow and print the issued credentials
    Authorize,

    /// Deliver a batch of lead records
    Deliver(DeliverArgs),
}

#[derive(Args, Debug)]
pub struct DeliverArgs {
    /// JSON array of lead records
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write per-record outcomes (stdout when omitted)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Where to write the failure report
    #[arg(long, value_name = "FILE")]
    pub failures: Option<PathBuf>,

    /// Records in flight at once; overrides the configured value
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long, env = "LEADSYNC_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    #[arg(long, env = "LEADSYNC_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: String,

    #[arg(long, env = "LEADSYNC_LOCATION_ID")]
    pub location_id: Option<String>,
}
