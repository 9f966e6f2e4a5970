//! Whoami command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::context::CliContext;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(ctx: &CliContext, _args: WhoamiArgs) -> Result<()> {
    if !ctx.client.is_authenticated().context("Failed to read credential")? {
        bail!("No active session. Run 'estatedesk login' first.");
    }

    let user = ctx.client.current_user().context("Failed to read credential")?;
    match &user {
        Some(user) => {
            output::field("User", &user.id);
            if let Some(name) = &user.name {
                output::field("Name", name);
            }
            if let Some(role) = &user.role {
                output::field("Role", role);
            }
        }
        None => output::field("User", "unknown"),
    }
    output::field("API", ctx.client.config().api_url.as_str());
    output::field("Credential file", &ctx.store.path().display().to_string());
    if let Some(saved_at) = ctx.store.saved_at().context("Failed to read credential")? {
        output::field("Saved", &saved_at.to_rfc3339());
    }

    Ok(())
}
