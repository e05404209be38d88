//! Enrichment engine
//!
//! One `run()` executes a fixed sequence of passes over the record store:
//!
//! STATS → CROSS-REFERENCE → GAP-FILL → DISCOVERY → DATA-QUALITY
//!
//! Each pass is an `impl EnrichmentEngine` block in its own `phase_*` module
//! taking the shared `RunContext`. A failing pass becomes one `EnrichmentError`
//! and the next pass still runs. `run()` itself never fails: a failure outside
//! the passes produces an error-only `EnrichmentRun` instead.
//!
//! # Dry run
//! Proposals are computed and recorded identically in both modes; only the
//! store writes are skipped. The change budget is checked before every
//! proposal, so applied writes never exceed `max_changes_per_run`.
//!
//! # Concurrency
//! Passes run sequentially. Concurrent `run()` calls are not coordinated and
//! race on the store and on `enrichment:lastRun` (last writer wins); callers
//! wanting mutual exclusion must hold their own lock.

use crate::db::RecordStore;
use crate::error::{EnrichError, Result};
use crate::models::{EnrichmentError, EnrichmentRun, EnrichmentStats};
use nexx_common::cache::{put_json, KvCache};
use nexx_common::config::EnrichmentConfig;
use nexx_common::time::now_rfc3339;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

mod context;
mod phase_cross_reference;
mod phase_discovery;
mod phase_gap_fill;
mod phase_quality;
mod statistics;

pub use context::RunContext;
pub use phase_cross_reference::extract_ic_numbers;
pub use statistics::{collect_stats, database_health, ic_coverage, TRACKED_FIELDS};

/// Most recent run, JSON `EnrichmentRun`
pub const LAST_RUN_KEY: &str = "enrichment:lastRun";
/// Prefix of the per-run audit trail key, JSON `Vec<EnrichmentChange>`
pub const AUDIT_KEY_PREFIX: &str = "enrichment_audit:";
/// Recent activity feed; deleted after every run
pub const FEED_KEY: &str = "enrichment_feed";
/// Scheduler pause flag
pub const PAUSED_KEY: &str = "enrichment:paused";

pub const LAST_RUN_TTL: Duration = Duration::from_secs(86_400 * 7);
pub const AUDIT_TTL: Duration = Duration::from_secs(86_400 * 30);

/// Change-log rows written per run
pub const LOG_LIMIT: usize = 50;

pub const PASS_CROSS_REFERENCE: &str = "cross-reference";
pub const PASS_GAP_FILL: &str = "fill-ics";
pub const PASS_DISCOVERY: &str = "discover-ics";
pub const PASS_QUALITY: &str = "validate-quality";
pub const ENGINE_TARGET: &str = "engine";

pub fn audit_key(run_id: &str) -> String {
    format!("{}{}", AUDIT_KEY_PREFIX, run_id)
}

/// `run_<epoch millis>_<6 base36 chars>`
pub fn generate_run_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("run_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// Per-run engine options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub dry_run: bool,
    pub max_changes_per_run: usize,
    pub cross_reference_sample: u32,
    pub gap_fill_sample: u32,
    pub quality_sample: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&EnrichmentConfig::default())
    }
}

impl From<&EnrichmentConfig> for EngineOptions {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            dry_run: config.dry_run,
            max_changes_per_run: config.max_changes_per_run,
            cross_reference_sample: config.cross_reference_sample,
            gap_fill_sample: config.gap_fill_sample,
            quality_sample: config.quality_sample,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_changes_per_run == 0 {
            return Err(EnrichError::InvalidOptions(
                "max_changes_per_run must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct EnrichmentEngine {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn KvCache>,
    options: EngineOptions,
}

impl EnrichmentEngine {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn KvCache>, options: EngineOptions) -> Self {
        Self {
            store,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Execute one enrichment run
    ///
    /// Never fails; inspect `EnrichmentRun::errors` for partial or total failure.
    pub async fn run(&self) -> EnrichmentRun {
        let run_id = generate_run_id();
        let started_at = now_rfc3339();
        let mut ctx = RunContext::new(self.options.max_changes_per_run);

        info!(
            run_id = %run_id,
            dry_run = self.options.dry_run,
            max_changes = self.options.max_changes_per_run,
            "Enrichment run started"
        );

        match self.execute(&run_id, &started_at, &mut ctx).await {
            Ok(run) => {
                info!(
                    run_id = %run.run_id,
                    changes = run.changes.len(),
                    errors = run.errors.len(),
                    health = run.stats.database_health,
                    "Enrichment run completed"
                );
                run
            }
            Err(e) => self.fail_run(run_id, started_at, ctx, e).await,
        }
    }

    /// Current completeness snapshot
    pub async fn collect_stats(&self) -> Result<EnrichmentStats> {
        collect_stats(self.store.as_ref()).await
    }

    async fn execute(
        &self,
        run_id: &str,
        started_at: &str,
        ctx: &mut RunContext,
    ) -> Result<EnrichmentRun> {
        let stats = self.collect_stats().await?;
        debug!(
            devices = stats.total_devices,
            health = stats.database_health,
            coverage = stats.ic_coverage,
            "Collected stats"
        );

        let result = self.phase_cross_reference(ctx).await;
        ctx.settle(PASS_CROSS_REFERENCE, result);

        let result = self.phase_gap_fill(ctx).await;
        ctx.settle(PASS_GAP_FILL, result);

        let result = self.phase_discovery(ctx).await;
        ctx.settle(PASS_DISCOVERY, result);

        let result = self.phase_quality(ctx).await;
        ctx.settle(PASS_QUALITY, result);

        let run = EnrichmentRun {
            run_id: run_id.to_string(),
            started_at: started_at.to_string(),
            completed_at: now_rfc3339(),
            dry_run: self.options.dry_run,
            stats,
            changes: ctx
                .changes()
                .iter()
                .take(ctx.max_changes())
                .cloned()
                .collect(),
            errors: ctx.errors().to_vec(),
        };

        put_json(self.cache.as_ref(), LAST_RUN_KEY, &run, Some(LAST_RUN_TTL)).await?;

        if !self.options.dry_run && !ctx.changes().is_empty() {
            put_json(
                self.cache.as_ref(),
                &audit_key(run_id),
                ctx.changes(),
                Some(AUDIT_TTL),
            )
            .await?;

            self.try_append_log(run_id, ctx).await;
        }

        self.cache.delete(FEED_KEY).await?;

        Ok(run)
    }

    /// Best-effort sink: the log table is optional, so failures stay at debug level
    async fn try_append_log(&self, run_id: &str, ctx: &RunContext) {
        let batch = &ctx.changes()[..ctx.changes().len().min(LOG_LIMIT)];
        if let Err(e) = self.store.append_log(run_id, batch).await {
            debug!(run_id = %run_id, "Change log not written: {}", e);
        }
    }

    /// Build and persist the error-path result
    async fn fail_run(
        &self,
        run_id: String,
        started_at: String,
        ctx: RunContext,
        cause: EnrichError,
    ) -> EnrichmentRun {
        error!(run_id = %run_id, "Enrichment run failed: {}", cause);

        let max_changes = ctx.max_changes();
        let (mut changes, mut errors) = ctx.into_parts();
        changes.truncate(max_changes);
        errors.push(EnrichmentError::new(ENGINE_TARGET, cause.to_string()));

        let stats = self.collect_stats().await.unwrap_or_default();

        let run = EnrichmentRun {
            run_id,
            started_at,
            completed_at: now_rfc3339(),
            dry_run: self.options.dry_run,
            stats,
            changes,
            errors,
        };

        if let Err(e) = put_json(self.cache.as_ref(), LAST_RUN_KEY, &run, Some(LAST_RUN_TTL)).await {
            warn!(run_id = %run.run_id, "Failed to persist failed run: {}", e);
        }

        // Passes may have written rows before the failure
        if let Err(e) = self.cache.delete(FEED_KEY).await {
            debug!(run_id = %run.run_id, "Activity feed not invalidated: {}", e);
        }

        run
    }
}
