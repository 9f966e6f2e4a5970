//! Subcommand implementations.

mod login;
mod logout;
mod request;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use estatedesk_core::Method;

use crate::cli::Cli;
use crate::context::CliContext;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the credential
    Login(login::LoginArgs),

    /// Sign out and forget the credential
    Logout(logout::LogoutArgs),

    /// Show the stored session
    Whoami(whoami::WhoamiArgs),

    /// GET an API path
    Get(request::ReadArgs),

    /// DELETE an API path
    Delete(request::ReadArgs),

    /// POST a JSON body to an API path
    Post(request::WriteArgs),

    /// PUT a JSON body to an API path
    Put(request::WriteArgs),
}

pub async fn handle(cli: Cli) -> Result<()> {
    let mut ctx = CliContext::new(&cli.connection)?;

    let result = match cli.command {
        Command::Login(args) => login::run(&ctx, args).await,
        Command::Logout(args) => logout::run(&ctx, args).await,
        Command::Whoami(args) => whoami::run(&ctx, args),
        Command::Get(args) => request::read(&ctx, Method::Get, args).await,
        Command::Delete(args) => request::read(&ctx, Method::Delete, args).await,
        Command::Post(args) => request::write(&ctx, Method::Post, args).await,
        Command::Put(args) => request::write(&ctx, Method::Put, args).await,
    };

    ctx.report_session_events();
    result
}
