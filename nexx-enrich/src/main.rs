//! nexx-enrich - Knowledge-base enrichment runner
//!
//! Operator entry point for the enrichment engine. Every command prints its
//! result as pretty JSON on stdout; logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use nexx_common::config::{ConfigSource, TomlConfig};
use nexx_common::{KvCache, SqliteCache};
use nexx_enrich::services::{self, EngineOptions, EnrichmentEngine};
use nexx_enrich::SqliteRecordStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nexx-enrich", version, about = "Enrich the NEXX repair knowledge base")]
struct Cli {
    /// Configuration file (overrides NEXX_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides NEXX_DATABASE_PATH and the config file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute one enrichment run (dry run unless --apply)
    Run {
        #[arg(long)]
        apply: bool,
        #[arg(long)]
        max_changes: Option<usize>,
    },
    /// Pause flag, last run and fresh stats
    Status,
    /// Most recent persisted run
    LastRun,
    Pause,
    Resume,
    /// Most recent change-log rows
    History {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Cached activity feed
    Feed {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Undo an applied run from its audit trail
    Revert { run_id: String },
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level, or `info` without a config
fn log_filter(config: Option<&TomlConfig>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.map_or("info", |c| c.logging.level.as_str());
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config is read before the subscriber exists so `[logging]` can set the
    // default level; where it came from is logged once tracing is up.
    let source = ConfigSource::locate(cli.config.as_deref());
    let loaded = TomlConfig::from_source(&source);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(loaded.as_ref().ok()))
        .init();

    info!(
        "Starting NEXX enrichment (nexx-enrich) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    source.log();
    let config = loaded?;

    let db_path = config.database_path(cli.database.as_deref());
    info!("Database path: {}", db_path.display());

    let pool = nexx_common::db::init_database(&db_path).await?;
    let store = Arc::new(SqliteRecordStore::new(pool.clone()));
    let cache = Arc::new(SqliteCache::new(pool));

    if let Err(e) = cache.purge_expired().await {
        warn!("Cache purge failed: {}", e);
    }

    match cli.command {
        Command::Run { apply, max_changes } => {
            if services::is_paused(cache.as_ref()).await? {
                info!("Enrichment is paused; run skipped");
                return print_json(&serde_json::json!({ "skipped": true, "reason": "paused" }));
            }

            let mut options = EngineOptions::from(&config.enrichment);
            if apply {
                options.dry_run = false;
            }
            if let Some(max) = max_changes {
                options.max_changes_per_run = max;
            }
            options.validate()?;

            let engine = EnrichmentEngine::new(store, cache, options);
            print_json(&engine.run().await)
        }
        Command::Status => print_json(&services::status(store.as_ref(), cache.as_ref()).await?),
        Command::LastRun => print_json(&services::last_run(cache.as_ref()).await?),
        Command::Pause => {
            services::pause(cache.as_ref()).await?;
            print_json(&serde_json::json!({ "paused": true }))
        }
        Command::Resume => {
            services::resume(cache.as_ref()).await?;
            print_json(&serde_json::json!({ "paused": false }))
        }
        Command::History { limit } => print_json(&services::history(store.as_ref(), limit).await?),
        Command::Feed { limit } => {
            print_json(&services::recent_activity(store.as_ref(), cache.as_ref(), limit).await?)
        }
        Command::Revert { run_id } => {
            print_json(&services::revert_run(store.as_ref(), cache.as_ref(), &run_id).await?)
        }
    }
}
