//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use estatedesk_core::LoginCredentials;

use crate::context::CliContext;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "ESTATEDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(ctx: &CliContext, args: LoginArgs) -> Result<()> {
    let credentials = LoginCredentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let user = ctx
        .client
        .login(credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("API", ctx.client.config().api_url.as_str());
    if let Some(user) = user {
        output::field("User", &user.id);
        if let Some(name) = &user.name {
            output::field("Name", name);
        }
        if let Some(role) = &user.role {
            output::field("Role", role);
        }
    }

    Ok(())
}
