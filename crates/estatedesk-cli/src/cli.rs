//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Command;

/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Command-line client for the estatedesk property management API.
#[derive(Parser, Debug)]
#[command(name = "estatedesk")]
#[command(author, version = env!("ESTATEDESK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where to reach the API and keep the credential.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// API base URL
    #[arg(long, global = true, env = "ESTATEDESK_API", default_value = DEFAULT_API_URL)]
    pub api: String,

    /// Route the request is made from; `/login` and `/signup` disable renewal
    #[arg(long, global = true, default_value = "/dashboard")]
    pub route: String,

    /// Credential file (defaults to the platform data directory)
    #[arg(long, global = true, env = "ESTATEDESK_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Give up on a credential renewal after this many seconds (0 waits forever)
    #[arg(long, global = true, default_value_t = 30)]
    pub renewal_timeout: u64,
}
