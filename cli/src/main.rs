//! `fray`: live combat overlay driven by a polled battle-state snapshot.

use std::path::PathBuf;

use clap::Parser;
use fray_core::{AppConfig, AppConfigExt, FeedSource, Scheduler};
use fray_overlay::{CombatOverlay, TextOverlay};
use fray_types::MatchMode;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Live combat overlay for a polled battle-state feed")]
struct Cli {
    /// Snapshot feed: http(s) URL or path to the exported JSON file
    #[arg(short, long)]
    feed: Option<String>,

    /// Poll period in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Correlate combatants between polls by id instead of roster position
    #[arg(long)]
    match_by_id: bool,

    /// Write every pixmap frame to this PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// Do not print text frames to stdout
    #[arg(short, long)]
    quiet: bool,

    /// Load settings from this TOML file instead of the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective settings back to the config file before starting
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn load_config(&self) -> AppConfig {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from(path),
            None => AppConfig::load(),
        };
        self.apply(&mut config);
        if self.save_config {
            self.store_config(&config);
        }
        config
    }

    fn store_config(&self, config: &AppConfig) {
        match &self.config {
            Some(path) => config.save_to(path),
            None => config.save(),
        }
    }

    /// Command-line flags win over the config file.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(feed) = &self.feed {
            config.feed.location = feed.clone();
        }
        if let Some(ms) = self.interval_ms {
            config.feed.poll_interval_ms = ms;
        }
        if self.match_by_id {
            config.feed.match_mode = MatchMode::Id;
        }
        if let Some(png) = &self.png {
            config.overlay.png_path = Some(png.display().to_string());
        }
    }
}

/// Initialize logging, writing to FRAY_LOG_PATH if set, otherwise stderr.
///
/// The returned guard flushes the file writer on drop.
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If FRAY_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("FRAY_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            return Some(guard);
        }
    }

    // Fallback to stderr; stdout carries the text overlay
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    None
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = init_logging();
    let cli = Cli::parse();
    let config = cli.load_config();

    let source = FeedSource::from_settings(&config.feed);
    let feed = source.location();

    let pixmap = match &config.overlay.png_path {
        Some(_) => Some(CombatOverlay::new(config.overlay.clone()).map_err(|e| e.to_string())?),
        None => None,
    };
    let text = if cli.quiet {
        TextOverlay::new()
    } else {
        TextOverlay::with_writer(std::io::stdout())
    };

    let mut scheduler = Scheduler::new(source, (text, pixmap), &config);
    info!(
        feed = %feed,
        period_ms = scheduler.period().as_millis() as u64,
        match_mode = ?config.feed.match_mode,
        "Starting overlay"
    );
    scheduler.run(shutdown_signal()).await;
    Ok(())
}
