//! tvd-client - command-line front end for the traffic violation detection service.
//!
//! # Overview
//!
//! Uploads each given video or image to the detection service, waits for the
//! real-time analysis, and paints the results. It initializes:
//! - Configuration loading ([`ConfigManager`]) with CLI overrides
//! - Logging infrastructure (file rotation + optional console output on stderr)
//! - A single-threaded tokio runtime
//! - The session ([`StateManager`]), notifications, and the orchestrator
//!
//! # Execution Flow
//!
//! 1. Load `client.yaml` from the config directory, apply `--api-url` / `--debug`
//! 2. Initialize logging
//! 3. Spawn the toast printer and the advisory health probe
//! 4. For each file in order: select, run, paint results
//! 5. Paint the running session stats

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tvd_client::models::CandidateFile;
use tvd_client::services::{HealthProbe, HttpClient, ProcessingOrchestrator, RunError};
use tvd_client::ui::{NotificationCenter, ResultRenderer, TerminalPainter};
use tvd_client::{APP_NAME, ConfigManager, StateManager, VERSION};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Videos or images to analyze, processed one after another.
    #[arg(required = true, value_name = "FILE")]
    files: Vec<Utf8PathBuf>,
    /// Directory holding client.yaml.
    #[arg(long, default_value = "config")]
    config_dir: Utf8PathBuf,
    /// Detection service base address (origin plus /api), overrides the config file.
    #[arg(long)]
    api_url: Option<String>,
    /// Declared media type for every file instead of guessing from the extension.
    #[arg(long)]
    media_type: Option<String>,
    /// Debug-level logging.
    #[arg(long)]
    debug: bool,
    /// Print view models as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = ConfigManager::new(&args.config_dir)?;
    let mut config = config_manager.load_config()?;
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if args.debug {
        config.logging.debug_mode = true;
    }

    let _log_guard = tvd_client::logging::setup_logging(&config.logging)?;
    tracing::info!("Starting {} v{} against {}", APP_NAME, VERSION, config.api.base_url);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let api = Arc::new(HttpClient::new(config.api.clone())?);
    runtime.block_on(run_session(args, api))
}

async fn run_session(args: Args, api: Arc<HttpClient>) -> Result<()> {
    let notifications = NotificationCenter::new();
    let orchestrator =
        ProcessingOrchestrator::new(StateManager::new(), Arc::clone(&api), notifications.clone());

    let toast_printer = spawn_toast_printer(&notifications);
    let health = HealthProbe::new(api, notifications).spawn();

    let mut painter = TerminalPainter::new(std::io::stdout().lock());
    let mut failures = 0usize;

    for path in &args.files {
        let candidate = match CandidateFile::from_path(path, args.media_type.as_deref()).await {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::error!("Cannot read {}: {}", path, e);
                failures += 1;
                continue;
            }
        };

        let file_view = match orchestrator.select_file(candidate) {
            Ok(view) => view,
            Err(_) => {
                failures += 1;
                continue;
            }
        };

        match orchestrator.run().await {
            Ok(report) => {
                if args.json {
                    painter.paint_json(&serde_json::json!({
                        "file": file_view,
                        "file_id": report.file_id,
                        "results": report.view,
                    }))?;
                } else {
                    painter.paint_file(&file_view)?;
                    painter.paint_results(&report.view)?;
                }
            }
            Err(RunError::Rejected(e)) => {
                tracing::error!("Run for {} did not start: {}", path, e);
                failures += 1;
            }
            Err(_) => failures += 1,
        }
    }

    let stats = orchestrator
        .state()
        .read(|s| ResultRenderer::stats(s.stats.stats()));
    if args.json {
        painter.paint_json(&serde_json::json!({ "stats": stats }))?;
    } else {
        painter.paint_stats(&stats)?;
    }
    painter.into_inner().flush()?;

    // Let the printer drain the last toast before shutting it down
    tokio::task::yield_now().await;
    health.abort();
    toast_printer.abort();

    if failures > 0 {
        bail!("{} of {} files failed", failures, args.files.len());
    }
    Ok(())
}

/// Echo every toast to stderr as it appears.
fn spawn_toast_printer(notifications: &NotificationCenter) -> tokio::task::JoinHandle<()> {
    let mut toasts = notifications.subscribe_toasts();
    tokio::spawn(async move {
        let mut painter = TerminalPainter::new(std::io::stderr());
        while toasts.changed().await.is_ok() {
            let toast = toasts.borrow_and_update().clone();
            if let Some(toast) = toast {
                if let Err(e) = painter.paint_toast(&toast) {
                    tracing::debug!("Failed to print toast: {}", e);
                }
            }
        }
    })
}
