//! url-visitor main entry point
//!
//! Command-line interface: visits the given URLs with a bounded pool of
//! workers and prints them ordered by body size.

use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url_visitor::config::{resolve_config, CliOverrides};
use url_visitor::shutdown::spawn_shutdown_listener;
use url_visitor::source::UrlSource;
use url_visitor::{Coordinator, ReqwestClient, UrlValidator, VisitorError};

/// Exit code for a run that collected every outcome
const EXIT_OK: i32 = 0;

/// Exit code for a run that was cancelled before it completed
const EXIT_CANCELLED: i32 = 1;

/// Exit code for invalid configuration or input
const EXIT_SETUP: i32 = 2;

/// url-visitor: visit URLs concurrently and rank them by body size
///
/// URLs are taken from the arguments, or one per line from stdin when no
/// arguments are given. URLs without a scheme are visited over http.
#[derive(Parser, Debug)]
#[command(name = "url-visitor")]
#[command(version)]
#[command(about = "Visit URLs concurrently and rank them by body size", long_about = None)]
struct Cli {
    /// URLs to visit (read from stdin when omitted)
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short = 'n', long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Cancel the whole run after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            EXIT_SETUP
        }
    };

    // exit explicitly so a pending stdin read cannot hold the runtime open
    std::process::exit(exit_code);
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("url_visitor=info,warn"),
            1 => EnvFilter::new("url_visitor=debug,info"),
            2 => EnvFilter::new("url_visitor=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            concurrency: self.concurrency,
            request_timeout_secs: self.timeout,
            deadline_secs: self.deadline,
        }
    }
}

/// Runs the application and returns the process exit code
async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = resolve_config(
        cli.config.as_deref(),
        |key| std::env::var(key).ok(),
        &cli.overrides(),
    )
    .context("invalid configuration")?;

    let source = UrlSource::from_cli(cli.urls, std::io::stdin().is_terminal())
        .context("no urls were provided")?;

    tracing::debug!(
        concurrency = config.visitor.concurrency,
        timeout_secs = config.visitor.request_timeout_secs,
        deadline_secs = ?config.visitor.deadline_secs,
        "Configuration resolved"
    );

    let client = ReqwestClient::new(config.visitor.request_timeout())
        .context("could not build HTTP client")?;
    let coordinator = Coordinator::new(Arc::new(client), &config)?;
    let validator = Arc::new(UrlValidator::new()?);

    let cancel = CancellationToken::new();
    let listener = spawn_shutdown_listener(cancel.clone(), config.visitor.deadline());

    let result = coordinator.visit(source, validator, cancel.clone()).await;

    // stop the listener if nothing else has
    cancel.cancel();
    if let Ok(Some(reason)) = listener.await {
        tracing::debug!(reason = %reason, "Run was cancelled by shutdown listener");
    }

    coordinator.stats().log_summary();

    let printed = result.and_then(|report| report.render(&mut std::io::stdout().lock(), cli.json));
    exit_code(printed)
}

/// Maps the end of a run to an exit code; anything but cancellation is a failure
fn exit_code(result: url_visitor::Result<()>) -> anyhow::Result<i32> {
    match result {
        Ok(()) => Ok(EXIT_OK),
        Err(VisitorError::Cancelled) => {
            tracing::warn!("Run did not complete");
            Ok(EXIT_CANCELLED)
        }
        Err(e) => Err(e.into()),
    }
}
