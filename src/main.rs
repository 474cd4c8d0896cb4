//! CLI entry point for the next-train service.
//!
//! `serve` (the default) answers "when is the next train" over HTTP; `check`
//! runs the pipeline once and prints the same line the service would return.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use next_train::config::{Config, ConfigArgs};
use next_train::pipeline::{Pipeline, from_bytes};
use next_train::present::render_board;
use next_train::web::{AppState, serve};
use reqwest::Url;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "next_train")]
#[command(about = "Next arrivals at one stop from a GTFS-RT feed", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the arrivals line and a health check over HTTP
    Serve,
    /// Run the pipeline once and print the arrivals line
    Check {
        /// Local feed file or URL; defaults to the configured feed URL
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();
    let config = Arc::new(Config::from_args(cli.config)?);
    let client = config.http_client()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!(
                feed_url = %config.feed_url,
                stop_id = %config.stop_id,
                max_trains = config.max_trains.get(),
                timeout_secs = config.fetch_timeout.as_secs(),
                "Starting arrivals service"
            );

            let listener = TcpListener::bind(config.bind)
                .await
                .with_context(|| format!("failed to bind {}", config.bind))?;
            let pipeline = Pipeline::new(client, Arc::clone(&config));

            serve(listener, AppState::new(pipeline)).await?;
        }
        Commands::Check { source } => {
            let now = Utc::now().timestamp();

            let outcome = match source {
                Some(url) if url.starts_with("http") => {
                    let feed_url = Url::parse(&url).with_context(|| format!("invalid URL {url}"))?;
                    let config = Config {
                        feed_url,
                        ..(*config).clone()
                    };
                    Pipeline::new(client, Arc::new(config)).run_at(now).await
                }
                Some(path) => {
                    let bytes =
                        std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;
                    from_bytes(&bytes, &config, now)
                }
                None => Pipeline::new(client, Arc::clone(&config)).run_at(now).await,
            };

            println!("{}", render_board(&config.label, &outcome));

            if let Err(e) = outcome {
                error!(error = %e, kind = ?e.kind(), "Check failed");
                return Err(e.into());
            }
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/next_train.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("next_train.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}
