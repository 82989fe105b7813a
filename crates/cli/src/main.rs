//! SaveLink — link game save directories into a cloud-synchronized
//! root and keep Steam's non-Steam shortcuts in sync with the game
//! list.
//!
//! # Usage
//!
//! ```text
//! savelink [--conf <file>] [--home-dir <dir>] [--games-dir <dir>]
//!          [--saves-dir <dir>] [--steam-dir <dir>] [--steam-user <id>]
//!          [--icons-dir <dir>] [--collection <name>]
//!          [--no-shortcuts] [--dry-run]
//! ```

mod config;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use savelink_protocol::Settings;
use savelink_saves::Linker;
use savelink_steam::{Paths, SyncConfig, first_user_with_shortcuts, sync_shortcuts};

/// Tag marking shortcut entries and the collection as SaveLink-owned.
const APP_MARKER: &str = "SaveLink";

#[derive(Parser, Debug)]
#[command(
    name = "savelink",
    version,
    about = "Link game save directories into a cloud-synced root and sync Steam shortcuts",
    long_about = None,
)]
struct Cli {
    /// Game list file (defaults to <saves-dir>/games.yml)
    #[arg(long)]
    conf: Option<PathBuf>,

    /// User home directory (defaults to $HOME)
    #[arg(long)]
    home_dir: Option<PathBuf>,

    /// Root directory holding per-game install directories
    #[arg(long)]
    games_dir: Option<PathBuf>,

    /// Cloud-synchronized save root
    #[arg(long)]
    saves_dir: Option<PathBuf>,

    /// Steam base directory (auto-detected when omitted)
    #[arg(long)]
    steam_dir: Option<PathBuf>,

    /// Steam user id (defaults to the first user with shortcuts)
    #[arg(long)]
    steam_user: Option<String>,

    /// Directory holding per-game <name>.ico files
    #[arg(long)]
    icons_dir: Option<PathBuf>,

    /// Display name of the owned Steam collection
    #[arg(long, default_value = "SaveLink Games")]
    collection: String,

    /// Skip Steam shortcut synchronization
    #[arg(long)]
    no_shortcuts: bool,

    /// Do not make any filesystem or registry modifications
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    EnvFilter::new("warn,savelink_cli=info,savelink_saves=info,savelink_steam=info")
                }),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let settings = config::settings(&cli)?;
    let conf_path = cli
        .conf
        .clone()
        .unwrap_or_else(|| settings.saves_dir.join("games.yml"));
    let games = config::load_games(&conf_path)?;
    info!(games = games.len(), conf = %conf_path.display(), "loaded game list");

    report::banner(&settings, &conf_path);

    // Link reconciliation, one game at a time.
    let mut linker = Linker::new(settings.clone());
    let mut events = linker
        .take_events()
        .context("event receiver already taken")?;
    let printer = tokio::spawn(async move {
        while let Some(ev) = events.recv().await {
            report::print_event(&ev);
        }
    });
    let link_results = linker.run(&games).await;
    drop(linker);
    let _ = printer.await;

    let mut errors = link_results.iter().filter(|r| r.error.is_some()).count();

    // Shortcut registry synchronization, once over the whole list.
    if !cli.no_shortcuts {
        match shortcut_config(&cli, &settings) {
            Ok(cfg) => match sync_shortcuts(&games, &cfg) {
                Ok(outcome) => {
                    println!("\n{}", "steam shortcuts".bold());
                    for result in &outcome.results {
                        report::print_shortcut_result(result);
                    }
                    errors += outcome
                        .results
                        .iter()
                        .filter(|r| r.error.is_some())
                        .count();
                    if let Some(err) = &outcome.collection_error {
                        // The container rewrite is already committed;
                        // this is reported, not fatal.
                        eprintln!("  {} collection index: {err}", "warning:".yellow().bold());
                    }
                    info!(written = outcome.shortcuts.len(), "shortcut sync complete");
                }
                Err(e) => {
                    eprintln!("{} shortcut sync failed: {e}", "error:".red().bold());
                    errors += 1;
                }
            },
            Err(e) => {
                warn!(error = %e, "steam not available, skipping shortcut sync");
                eprintln!(
                    "{} skipping shortcut sync: {e:#}",
                    "warning:".yellow().bold()
                );
            }
        }
    }

    report::summary(&link_results, errors);
    Ok(errors == 0)
}

fn shortcut_config(cli: &Cli, settings: &Settings) -> Result<SyncConfig> {
    let paths = match &cli.steam_dir {
        Some(dir) => Paths::with_base(dir),
        None => Paths::new().context("steam installation not found")?,
    };
    let user_id = match &cli.steam_user {
        Some(id) => id.clone(),
        None => first_user_with_shortcuts(&paths)?
            .context("no steam user found")?
            .id,
    };
    Ok(SyncConfig {
        games_dir: settings.games_dir.clone(),
        shortcuts_path: paths.shortcuts_path(&user_id),
        collections_path: paths.collections_path(&user_id),
        app_marker: APP_MARKER.to_string(),
        collection_name: cli.collection.clone(),
        icons_dir: cli.icons_dir.clone(),
        dry_run: settings.dry_run,
    })
}
