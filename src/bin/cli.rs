//! Raycast stats CLI
//!
//! Running without arguments performs one pipeline pass: load the snapshot,
//! fetch the catalog, push the encrypted report to Bark, save the snapshot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use raycast_stats::{
    crypto::SecureChannel,
    error::Result,
    models::{Config, EnvConfig},
    pipeline::{self, RunOptions},
    services::{BarkClient, CatalogFetcher},
    storage::{LocalStorage, SnapshotStore},
    utils::http,
};

/// Raycast extension stats notifier
#[derive(Parser, Debug)]
#[command(
    name = "raycast-stats",
    version,
    about = "Push Raycast extension download changes to Bark"
)]
struct Cli {
    /// Directory holding the snapshot and optional config.toml
    /// (default: directory of this executable)
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Path to settings file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, diff, notify and save (default)
    Run {
        /// Print the report without sending it or saving the snapshot
        #[arg(long)]
        dry_run: bool,
    },

    /// Check environment and settings without touching the network
    Validate,

    /// Show the stored snapshot
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Directory containing the running executable.
fn install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();
    init_logging(cli.verbose);

    if let Ok(path) = dotenv {
        log::debug!("Loaded environment from {}", path.display());
    }

    let storage_dir = cli.storage_dir.unwrap_or_else(install_dir);
    let config_path = cli
        .config
        .unwrap_or_else(|| storage_dir.join("config.toml"));
    let config = Config::load_or_default(&config_path);
    config.validate()?;

    let storage = LocalStorage::with_file_name(&storage_dir, &config.storage.snapshot_file);

    match cli.command.unwrap_or(Command::Run { dry_run: false }) {
        Command::Run { dry_run } => {
            let env = EnvConfig::from_env()?;
            let channel = SecureChannel::new(&env.encrypt_key, &env.encrypt_iv, env.key_encoding)?;

            let client = http::create_client(&config.http)?;
            let fetcher = CatalogFetcher::new(client.clone(), &env.raycast_api_url);
            let bark = BarkClient::new(
                client,
                env.bark_endpoint(),
                &env.icon,
                config.notification.clone(),
                channel,
            );

            let summary =
                pipeline::run_pipeline(&storage, &fetcher, &bark, &RunOptions { dry_run }).await?;

            log::info!(
                "Done: {} extensions, stage '{}'",
                summary.item_count(),
                summary.stage
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            let env = EnvConfig::from_env()?;
            let channel = SecureChannel::new(&env.encrypt_key, &env.encrypt_iv, env.key_encoding)?;
            log::info!("✓ Environment OK ({:?})", channel.key_size());
            log::info!("✓ Settings OK ({})", config_path.display());
            storage.load().await?;
            log::info!("✓ Snapshot OK ({})", storage.snapshot_path().display());
        }

        Command::Info => {
            log::info!("Storage directory: {}", storage.root_dir().display());
            let path = storage.snapshot_path();
            if !path.exists() {
                log::info!("No snapshot found yet.");
                return Ok(());
            }

            let snapshot = storage.load().await?;
            log::info!(
                "Snapshot {}: {} extensions, {} downloads",
                path.display(),
                snapshot.len(),
                snapshot.total()
            );
            let mut entries: Vec<_> = snapshot.iter().collect();
            entries.sort_by(|a, b| b.1.cmp(&a.1));
            for (name, count) in entries {
                log::info!("    {}: {}", name, count);
            }
        }
    }

    Ok(())
}
