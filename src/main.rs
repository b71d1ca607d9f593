//! Command-line front end: run one analysis and print the result as JSON.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use nlu_analyze::config::{Cli, ServiceConfig};
use nlu_analyze::{AnalyzeClient, Error};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env first so clap's `env` fallbacks can see it
    let _ = dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(name: "nlu.cli.failed", error = %format!("{err:#}"), "Analysis failed");
            eprintln!("error: {err:#}");
            exit_code(&err)
        }
    }
}

/// Initialize tracing (M-LOG-STRUCTURED). Logs go to stderr; stdout carries the result.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_target(true).with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ServiceConfig::from_cli(&cli).context("failed to load configuration")?;

    info!(
        name: "nlu.config.loaded",
        url = %config.service.url,
        version = %config.service.version,
        timeout_secs = config.service.timeout_secs,
        "Service configuration loaded"
    );

    let client = AnalyzeClient::from_config(&config)?;
    let request = cli.analyze.to_request()?;

    // Ctrl-C cancels the in-flight call
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let outcome = client.execute_with_cancel(&request, &cancel).await;
    watcher.abort();

    let result = outcome?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// 2 for configuration and argument errors, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<config::ConfigError>().is_some() {
        return ExitCode::from(2);
    }
    match err.downcast_ref::<Error>() {
        Some(
            Error::InvalidArgument(_)
            | Error::MissingInput
            | Error::ConflictingInput(_)
            | Error::MissingFeatures
            | Error::InvalidConfig(_),
        ) => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}
