//! Search Traffic Monitor CLI
//!
//! A batch job that compares the most recent observable day of per-page
//! clicks and impressions against a trailing baseline window and reports
//! pages deviating by 1/2/3 population standard deviations.

mod config;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use monitor_lib::{
    CancelFlag, ClientConfig, DateWindows, MonitorPipeline, RetryPolicy, SearchConsoleClient,
    TieredClassifier, UrlFilter,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Search Traffic Monitor CLI
#[derive(Parser)]
#[command(name = "stm")]
#[command(author, version, about = "Day-over-day search traffic anomaly monitor", long_about = None)]
struct Cli {
    /// Site or app URI to query data for (including trailing slash)
    #[arg(value_parser = parse_property_uri)]
    property_uri: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

/// The query API identifies properties by their exact URI, slash included
fn parse_property_uri(value: &str) -> Result<String, String> {
    if value.ends_with('/') {
        Ok(value.to_string())
    } else {
        Err("property URI must include the trailing slash".to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_target(false))
        .init();

    let settings = config::MonitorSettings::load()?;
    let auth_token = settings.require_auth_token()?.to_string();

    let windows = DateWindows::for_run(
        Local::now().date_naive(),
        settings.recent_offset,
        settings.lookback_days,
    )?;
    info!(
        property = %cli.property_uri,
        observation = %windows.observation,
        baseline_start = %windows.baseline_start,
        baseline_end = %windows.baseline_exclusion,
        "starting monitoring run"
    );

    let mut client_config = ClientConfig::new(cli.property_uri, auth_token);
    client_config.api_url = settings.api_url.clone();
    client_config.row_limit = settings.row_limit;
    client_config.retry = RetryPolicy {
        max_attempts: 2,
        backoff: Duration::from_secs(settings.retry_cooldown_secs),
    };
    let client =
        SearchConsoleClient::new(client_config).context("Failed to create query client")?;

    let pipeline = MonitorPipeline::new(
        client,
        UrlFilter::new(settings.excluded_fragments),
        TieredClassifier::default(),
        windows,
    );

    let cancel = CancelFlag::new();
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing the page in flight");
            signal_flag.cancel();
        }
    });

    let report = pipeline.run(&cancel).await.context("Monitoring run failed")?;
    output::print_report(&report, cli.format)?;

    Ok(())
}
