//! blessing-harvest - Spring Festival blessing corpus harvester
//!
//! Fills a relationship × style × length grid of blessings from web sources
//! and writes `blessings.json` (snapshot) and `scrape_progress.json`
//! (per-combination progress) into the root folder.
//!
//! Commands:
//! - `run [--resume]` (default): bulk phase then targeted phase
//! - `stats`: coverage report of the persisted snapshot
//! - `dry-run`: seed URLs and generated queries, nothing fetched

use anyhow::{Context, Result};
use blessing_common::config::{RootFolderInitializer, RootFolderResolver};
use blessing_harvest::config::HarvestFileConfig;
use blessing_harvest::services::{
    AcquisitionOrchestrator, BucketStore, CoverageReport, DryRunPlan, QueryBuilder, SeedCatalog,
    SnapshotStore,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Command-line arguments for blessing-harvest
#[derive(Parser, Debug)]
#[command(name = "blessing-harvest")]
#[command(about = "Harvest and classify Spring Festival blessings")]
#[command(version)]
struct Args {
    /// Output folder for the snapshot and progress files
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full acquisition
    Run {
        /// Restore the persisted snapshot and skip completed combinations
        #[arg(long)]
        resume: bool,
    },
    /// Print the coverage report of the persisted snapshot
    Stats,
    /// Print seed URLs and search queries without fetching
    DryRun,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(blessing_common::config::default_config_path);
    let config = HarvestFileConfig::load(config_path.as_deref())
        .context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.base.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = blessing_harvest::GIT_HASH,
        profile = blessing_harvest::BUILD_PROFILE,
        "Starting blessing-harvest"
    );
    match &config_path {
        Some(path) if path.exists() => info!(path = %path.display(), "Configuration loaded"),
        _ => info!("No configuration file, using defaults"),
    }

    let root_folder = RootFolderResolver::new(args.root_folder.clone(), &config.base).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    let persistence = SnapshotStore::in_root_folder(&initializer);

    match args.command.unwrap_or(Command::Run { resume: false }) {
        Command::Run { resume } => run(&config, &initializer, persistence, resume).await,
        Command::Stats => stats(&config, persistence),
        Command::DryRun => dry_run(persistence),
    }
}

async fn run(
    config: &HarvestFileConfig,
    initializer: &RootFolderInitializer,
    persistence: SnapshotStore,
    resume: bool,
) -> Result<()> {
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!(root_folder = %initializer.root_folder().display(), "Root folder ready");

    if !resume && persistence.snapshot_path().exists() {
        warn!(
            path = %persistence.snapshot_path().display(),
            "Existing snapshot will be overwritten (use --resume to continue it)"
        );
    }

    let collaborators = blessing_harvest::http_collaborators(&config.harvest)?;
    let mut orchestrator = AcquisitionOrchestrator::new(&config.harvest, persistence, collaborators);
    if resume {
        orchestrator
            .resume_from_disk()
            .context("Failed to resume from persisted state")?;
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping after the current step");
            on_signal.cancel();
        }
    });

    let report = orchestrator.run(&cancel).await?;

    println!("{}", report);
    println!();
    print!("{}", orchestrator.coverage());
    Ok(())
}

fn stats(config: &HarvestFileConfig, persistence: SnapshotStore) -> Result<()> {
    let Some(snapshot) = persistence.load_snapshot()? else {
        println!("No snapshot at {}", persistence.snapshot_path().display());
        return Ok(());
    };
    if let Some(metadata) = &snapshot.metadata {
        println!("Snapshot generated at {}", metadata.generated_at);
    }

    let mut store = BucketStore::new(&config.harvest);
    store.restore(snapshot.into_cells());
    print!("{}", CoverageReport::from_grid(store.grid(), store.quota()));
    Ok(())
}

fn dry_run(persistence: SnapshotStore) -> Result<()> {
    let progress = persistence.load_progress()?;
    let plan = DryRunPlan::build(
        &SeedCatalog::builtin(),
        &mut QueryBuilder::from_entropy(),
        progress.as_ref(),
    );
    print!("{}", plan);
    Ok(())
}
