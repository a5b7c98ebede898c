// src/bin/cli.rs

//! feedscan CLI
//!
//! Replays a scripted feed through the scan session for local development
//! and testing. Real pages are driven by integrators through the
//! `FeedPage` trait.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};

use feedscan::config::load_all;
use feedscan::driver::Phase;
use feedscan::error::Result;
use feedscan::export;
use feedscan::page::ScriptedPage;
use feedscan::render::ConsoleRenderer;
use feedscan::session::ScanSession;
use feedscan::storage::JsonFileStore;

#[derive(Parser, Debug)]
#[command(
    name = "feedscan",
    version = "0.1.0",
    about = "Infinite-scroll feed scanner"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// CLI Commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scripted feed and export the collected records
    Run {
        /// Path to the feed script (JSON)
        script: PathBuf,

        /// Output file; defaults into the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Override the stored threshold for this run
        #[arg(long)]
        threshold: Option<u64>,

        /// Stop after this many ticks even if the driver is still going
        #[arg(long)]
        max_ticks: Option<u32>,
    },
    /// Validate configuration and locale data
    Validate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Table,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let (config, locale) = load_all(&base_path)?;

    match cli.command {
        Command::Run {
            script,
            output,
            format,
            threshold,
            max_ticks,
        } => {
            let page = ScriptedPage::from_file(&script)?;
            let renderer = ConsoleRenderer::new(&locale);
            let prefs = JsonFileStore::new(base_path.join("data/prefs.json"));
            let output_dir = config.export.output_dir.clone();
            let tick_ms = config.driver.tick_interval_ms;

            let mut session =
                ScanSession::activate(page, config, locale, Box::new(renderer), Box::new(prefs))?;
            if let Some(value) = threshold {
                session.set_threshold(value);
            }

            let started = chrono::Utc::now();
            run_loop(&mut session, tick_ms, max_ticks).await;
            session.stop();
            log::info!(
                "Run finished in {}s: {} records, {} scrolls, {} items seen",
                (chrono::Utc::now() - started).num_seconds(),
                session.records().len(),
                session.state().scroll_count,
                session.state().seen_ids.len(),
            );

            let output = output.unwrap_or_else(|| {
                PathBuf::from(output_dir).join(match format {
                    Format::Text => "records.txt",
                    Format::Table => "records.csv",
                })
            });
            let content = match format {
                Format::Text => session.export_text(),
                Format::Table => session.export_table(),
            };
            if let Err(e) = export::save(&output, &content) {
                log::error!("Export failed: {e}");
                log::error!("{}", session.locale().messages.export_fallback);
                for line in session.raw_lines() {
                    println!("{line}");
                }
            }
        }
        Command::Validate => {
            log::info!("Configuration and locale are valid");
        }
    }

    Ok(())
}

/// Drive the session on a periodic tick until it pauses, fails, or hits
/// the tick limit.
async fn run_loop(session: &mut ScanSession<ScriptedPage>, tick_ms: u64, max_ticks: Option<u32>) {
    // The driver ignores ticks that arrive mid-wait; extra ticks are no-ops.
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms.max(50)));
    let mut ticks = 0u32;

    loop {
        interval.tick().await;
        session.tick(Instant::now());
        ticks += 1;

        match session.phase() {
            Phase::Paused | Phase::Failed => break,
            _ => {}
        }
        if max_ticks.is_some_and(|max| ticks >= max) {
            log::warn!("Tick limit reached after {ticks} ticks");
            break;
        }
    }
}
