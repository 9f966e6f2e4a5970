//! Raw API request commands (get, delete, post, put).

use anyhow::{Context, Result, anyhow};
use clap::Args;

use estatedesk_core::{Method, RequestEnvelope};

use crate::context::CliContext;
use crate::output;

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// API path, e.g. /tenants
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q', value_parser = parse_pair)]
    pub query: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// API path, e.g. /tenants
    pub path: String,

    /// JSON request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

pub async fn read(ctx: &CliContext, method: Method, args: ReadArgs) -> Result<()> {
    let envelope = args
        .query
        .into_iter()
        .fold(RequestEnvelope::new(method, args.path), |envelope, (k, v)| {
            envelope.with_query(k, v)
        });

    send(ctx, envelope).await
}

pub async fn write(ctx: &CliContext, method: Method, args: WriteArgs) -> Result<()> {
    let mut envelope = RequestEnvelope::new(method, args.path);
    if let Some(data) = &args.data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("Request body is not valid JSON")?;
        envelope = envelope.with_json_value(body);
    }

    send(ctx, envelope).await
}

async fn send(ctx: &CliContext, envelope: RequestEnvelope) -> Result<()> {
    let description = format!("{} {}", envelope.method(), envelope.path());
    let response = ctx
        .client
        .send(envelope)
        .await
        .with_context(|| format!("{} failed", description))?;

    output::body(response.body())
}

fn parse_pair(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_pairs() {
        assert_eq!(
            parse_pair("status=overdue").unwrap(),
            ("status".to_string(), "overdue".to_string())
        );
        assert_eq!(
            parse_pair("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_pair("overdue").is_err());
    }
}
