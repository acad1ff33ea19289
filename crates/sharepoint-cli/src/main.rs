//! `spctl` - command-line access to a SharePoint Online site.
//!
//! Reads `SPURL`, `SPAppId` and `SPAppSecret` from the environment, obtains
//! an app-only token and writes the raw response body to stdout.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use anyhow::{Context, Result, bail};
use pico_args::Arguments;
use sharepoint_client::{ODataQuery, SharePointClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
Usage: spctl <command> [options]

Commands:
  get <path> [--select a,b] [--expand x] [--filter expr]... [--order-by 'f [desc]']...
  delete <path>
  post <path> <file|->
  token

Paths are relative to {site}/_api/ unless they start with _api/ or are absolute URLs.

Environment:
  SPURL, SPAppId, SPAppSecret   site URL and app-only credentials
  RUST_LOG                      log filter (default: info)
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Get { path: String, query: ODataQuery },
    Delete { path: String },
    Post { path: String, source: String },
    Token,
    Help,
}

impl Command {
    fn parse(mut pargs: Arguments) -> Result<Self> {
        if pargs.contains(["-h", "--help"]) {
            return Ok(Self::Help);
        }

        let command = match pargs.subcommand().context("parsing command")?.as_deref() {
            Some("get") => {
                let query = parse_query(&mut pargs)?;
                let path = pargs.free_from_str().context("missing <path>")?;
                Self::Get { path, query }
            }
            Some("delete") => Self::Delete {
                path: pargs.free_from_str().context("missing <path>")?,
            },
            Some("post") => Self::Post {
                path: pargs.free_from_str().context("missing <path>")?,
                source: pargs.free_from_str().context("missing <file|->")?,
            },
            Some("token") => Self::Token,
            None => Self::Help,
            Some(other) => bail!("unknown command: {other}"),
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Unused arguments left");
        }
        Ok(command)
    }

    fn from_env() -> Result<Self> {
        Self::parse(Arguments::from_env())
    }

    #[cfg(test)]
    fn from_args(args: &[&str]) -> Result<Self> {
        Self::parse(Arguments::from_vec(
            args.iter().map(std::ffi::OsString::from).collect(),
        ))
    }
}

fn parse_query(pargs: &mut Arguments) -> Result<ODataQuery> {
    let mut query = ODataQuery::new();

    let select: Option<String> = pargs.opt_value_from_str("--select").context("--select")?;
    for field in select.iter().flat_map(|s| s.split(',')) {
        query = query.select(field.trim());
    }
    let expand: Option<String> = pargs.opt_value_from_str("--expand").context("--expand")?;
    for field in expand.iter().flat_map(|s| s.split(',')) {
        query = query.expand(field.trim());
    }
    let filters: Vec<String> = pargs.values_from_str("--filter").context("--filter")?;
    for filter in filters {
        query = query.filter(filter);
    }
    let orders: Vec<String> = pargs.values_from_str("--order-by").context("--order-by")?;
    for order in orders {
        query = match order.trim().strip_suffix(" desc") {
            Some(field) => query.order_by_desc(field.trim()),
            None => query.order_by(order.trim()),
        };
    }

    Ok(query)
}

async fn read_body(source: &str) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    if source == "-" {
        tokio::io::stdin()
            .read_to_end(&mut body)
            .await
            .context("reading body from stdin")?;
    } else {
        body = tokio::fs::read(source)
            .await
            .with_context(|| format!("reading body from {source}"))?;
    }
    Ok(body)
}

async fn write_stdout(body: &[u8]) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(body).await.context("writing response")?;
    stdout.flush().await.context("writing response")
}

async fn run(command: Command) -> Result<()> {
    if command == Command::Help {
        print!("{USAGE}");
        return Ok(());
    }

    let client = SharePointClient::from_env().context("loading configuration")?;
    info!(site = %client.site_url(), "Connecting");

    match command {
        Command::Get { path, query } => {
            let body = client
                .get_with_query(&path, &query)
                .await
                .with_context(|| format!("GET {path}"))?;
            write_stdout(&body).await
        }
        Command::Delete { path } => {
            let body = client
                .delete(&path)
                .await
                .with_context(|| format!("DELETE {path}"))?;
            write_stdout(&body).await
        }
        Command::Post { path, source } => {
            let payload = read_body(&source).await?;
            let body = client
                .post_json(&path, payload)
                .await
                .with_context(|| format!("POST {path}"))?;
            write_stdout(&body).await
        }
        Command::Token => {
            let token = client
                .get_valid_token()
                .await
                .context("acquiring access token")?;
            println!("token_type: {}", token.token_type);
            println!("resource:   {}", token.resource);
            match token.expires_at() {
                Some(at) => println!("expires_at: {at}"),
                None => println!("expires_on: {}", token.expires_on),
            }
            Ok(())
        }
        Command::Help => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the response body
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spctl=info,sharepoint_client=info,sharepoint_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = Command::from_env().context("parsing arguments")?;
    run(command).await
}
