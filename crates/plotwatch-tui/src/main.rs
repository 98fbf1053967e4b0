//! `plotwatch` — terminal dashboard for a fleet of plot workers.
//!
//! Polls every configured host on a fixed cadence, merges the reports
//! into keyed tables (active plots, directories, archive, hosts), and
//! mirrors the selected job's log tail into a detail panel. Built on
//! [ratatui](https://ratatui.rs); all state mutation is serialized
//! through a single action queue.
//!
//! Logs are written to a file (default `/tmp/plotwatch.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod data_bridge;
mod event;
mod rows;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use plotwatch_core::{StatusClient, spawn_poller};

use crate::app::App;

/// Terminal dashboard for monitoring plot workers.
#[derive(Parser, Debug)]
#[command(name = "plotwatch", version, about)]
struct Cli {
    /// Comma-separated worker hosts (host[:port]; default port 8484)
    #[arg(short = 'H', long, env = "PLOTWATCH_HOSTS")]
    hosts: Option<String>,

    /// Config file path (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file path (defaults to /tmp/plotwatch.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that
/// would corrupt the TUI output. Returns a guard that must be held for
/// the lifetime of the application so logs flush on exit.
fn setup_tracing(log_file: &std::path::Path, verbose: u8) -> WorkerGuard {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plotwatch={log_level}")));

    let log_dir = log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("plotwatch.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let config = plotwatch_config::load_config(cli.config.as_deref())?;

    // CLI host list overrides the config file.
    let hosts = match &cli.hosts {
        Some(list) => plotwatch_config::parse_hosts(list),
        None => config.normalized_hosts(),
    };
    if hosts.is_empty() {
        bail!("no hosts configured: pass --hosts or set hosts in the config file");
    }

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.log_file.clone())
        .unwrap_or_else(|| PathBuf::from("/tmp/plotwatch.log"));

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&log_file, cli.verbose);

    info!(?hosts, "starting plotwatch");

    let client = StatusClient::with_timeout(Duration::from_secs(config.request_timeout_secs))?;

    let (poll_tx, poll_rx) = tokio::sync::mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let poller = spawn_poller(
        client,
        hosts,
        Duration::from_secs(config.poll_interval_secs),
        poll_tx,
        cancel.clone(),
    );

    let mut app = App::new();
    let bridge = data_bridge::spawn_poll_bridge(poll_rx, app.action_sender());

    let result = app.run().await;

    // Stop background tasks before tearing down the terminal state.
    cancel.cancel();
    let _ = poller.await;
    bridge.abort();

    result
}
