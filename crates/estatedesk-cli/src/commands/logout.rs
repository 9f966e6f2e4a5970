//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::context::CliContext;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(ctx: &CliContext, _args: LogoutArgs) -> Result<()> {
    if !ctx.client.is_authenticated().context("Failed to read credential")? {
        output::success("Not logged in");
        return Ok(());
    }

    ctx.client.logout().await.context("Failed to logout")?;

    output::success("Logged out");
    Ok(())
}
