//! Change history, activity feed and revert of applied runs
//!
//! An applied run leaves two trails: the full change list under
//! `enrichment_audit:{runId}` (30-day TTL) and up to fifty rows in the
//! optional `enrichment_log` table. Revert works from the audit trail; the
//! log only gets its rows flagged.

use super::enrichment_engine::{audit_key, FEED_KEY};
use crate::db::{DeviceField, RecordStore};
use crate::error::{EnrichError, Result};
use crate::models::{ChangeAction, EnrichmentChange, RevertReport};
use nexx_common::cache::{get_json, put_json};
use nexx_common::db::EnrichmentLogEntry;
use nexx_common::KvCache;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifetime of a rebuilt activity feed
pub const FEED_TTL: Duration = Duration::from_secs(300);

/// Most recent change-log rows, newest first
pub async fn history(store: &dyn RecordStore, limit: u32) -> Result<Vec<EnrichmentLogEntry>> {
    store.recent_log(limit).await
}

/// Activity feed for dashboards
///
/// Any cached feed is served, even one shorter than `limit`; every run
/// deletes the cached feed so the next read rebuilds it from history.
pub async fn recent_activity(
    store: &dyn RecordStore,
    cache: &dyn KvCache,
    limit: u32,
) -> Result<Vec<EnrichmentLogEntry>> {
    match get_json::<Vec<EnrichmentLogEntry>>(cache, FEED_KEY).await {
        Ok(Some(mut feed)) => {
            feed.truncate(limit as usize);
            return Ok(feed);
        }
        Ok(_) => {}
        Err(nexx_common::Error::Serialization(e)) => {
            debug!("Rebuilding unreadable activity feed: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    let feed = history(store, limit).await?;
    put_json(cache, FEED_KEY, &feed, Some(FEED_TTL)).await?;
    Ok(feed)
}

/// Undo an applied run
///
/// Device fields are restored to their recorded prior value, newest change
/// first, and components the run inserted are removed. The audit trail is
/// consumed, so a second revert of the same run fails with `AuditMissing`.
pub async fn revert_run(
    store: &dyn RecordStore,
    cache: &dyn KvCache,
    run_id: &str,
) -> Result<RevertReport> {
    let changes = get_json::<Vec<EnrichmentChange>>(cache, &audit_key(run_id))
        .await?
        .ok_or_else(|| EnrichError::AuditMissing(run_id.to_string()))?;

    let mut report = RevertReport {
        run_id: run_id.to_string(),
        restored_fields: 0,
        removed_components: 0,
        skipped: 0,
    };

    for change in changes.iter().rev() {
        match change.action {
            ChangeAction::Enrich => match change.field.parse::<DeviceField>() {
                Ok(field) => {
                    store
                        .update_device_field(&change.target, field, change.old_value.as_deref())
                        .await?;
                    report.restored_fields += 1;
                }
                Err(e) => {
                    warn!(run_id = %run_id, "Skipping change: {}", e);
                    report.skipped += 1;
                }
            },
            ChangeAction::IcAdd => {
                if store.delete_component(&change.target).await? {
                    report.removed_components += 1;
                }
            }
            other => {
                warn!(run_id = %run_id, action = %other, "Skipping change with no revert rule");
                report.skipped += 1;
            }
        }
    }

    if let Err(e) = store.mark_run_reverted(run_id).await {
        debug!(run_id = %run_id, "Change log not flagged: {}", e);
    }

    cache.delete(&audit_key(run_id)).await?;
    cache.delete(FEED_KEY).await?;

    info!(
        run_id = %run_id,
        restored = report.restored_fields,
        removed = report.removed_components,
        skipped = report.skipped,
        "Run reverted"
    );
    Ok(report)
}
