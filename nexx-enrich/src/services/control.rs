//! Operator controls
//!
//! The pause flag is advisory: `EnrichmentEngine::run` never reads it. Whatever
//! schedules runs (the CLI `run` command here) checks `is_paused` first.

use super::enrichment_engine::{collect_stats, LAST_RUN_KEY, PAUSED_KEY};
use crate::db::RecordStore;
use crate::error::Result;
use crate::models::{EngineStatus, EnrichmentRun};
use nexx_common::cache::get_json;
use nexx_common::KvCache;
use tracing::{info, warn};

const PAUSED_VALUE: &str = "true";

pub async fn is_paused(cache: &dyn KvCache) -> Result<bool> {
    Ok(cache.get(PAUSED_KEY).await?.as_deref() == Some(PAUSED_VALUE))
}

/// Set the pause flag; it has no expiry
pub async fn pause(cache: &dyn KvCache) -> Result<()> {
    cache.put(PAUSED_KEY, PAUSED_VALUE, None).await?;
    info!("Enrichment paused");
    Ok(())
}

pub async fn resume(cache: &dyn KvCache) -> Result<()> {
    cache.delete(PAUSED_KEY).await?;
    info!("Enrichment resumed");
    Ok(())
}

/// Most recent persisted run; an unreadable entry reads as absent
pub async fn last_run(cache: &dyn KvCache) -> Result<Option<EnrichmentRun>> {
    match get_json::<EnrichmentRun>(cache, LAST_RUN_KEY).await {
        Ok(run) => Ok(run),
        Err(nexx_common::Error::Serialization(e)) => {
            warn!("Discarding unreadable last run: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn status(store: &dyn RecordStore, cache: &dyn KvCache) -> Result<EngineStatus> {
    Ok(EngineStatus {
        paused: is_paused(cache).await?,
        last_run: last_run(cache).await?,
        stats: collect_stats(store).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::enrichment_engine::test_support::*;
    use super::super::enrichment_engine::EngineOptions;
    use super::*;
    use crate::db::SqliteRecordStore;
    use nexx_common::SqliteCache;

    #[tokio::test]
    async fn test_pause_resume() {
        let pool = memory_pool().await;
        let cache = SqliteCache::new(pool);

        assert!(!is_paused(&cache).await.unwrap());
        pause(&cache).await.unwrap();
        assert!(is_paused(&cache).await.unwrap());
        assert_eq!(cache.get(PAUSED_KEY).await.unwrap().as_deref(), Some("true"));
        resume(&cache).await.unwrap();
        assert!(!is_paused(&cache).await.unwrap());
    }

    #[tokio::test]
    async fn test_other_flag_values_are_not_paused() {
        let pool = memory_pool().await;
        let cache = SqliteCache::new(pool);

        cache.put(PAUSED_KEY, "yes", None).await.unwrap();
        assert!(!is_paused(&cache).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_last_run_reads_as_none() {
        let pool = memory_pool().await;
        let cache = SqliteCache::new(pool);

        assert!(last_run(&cache).await.unwrap().is_none());
        cache.put(LAST_RUN_KEY, "{not json", None).await.unwrap();
        assert!(last_run(&cache).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_reports_run_and_stats() {
        let pool = memory_pool().await;
        insert_device(&pool, "iPhone 13", None, None, None).await;

        let engine = engine(&pool, EngineOptions::default());
        let run = engine.run().await;

        let store = SqliteRecordStore::new(pool.clone());
        let cache = SqliteCache::new(pool);
        pause(&cache).await.unwrap();

        let status = status(&store, &cache).await.unwrap();
        assert!(status.paused);
        assert_eq!(status.last_run, Some(run));
        assert_eq!(status.stats.total_devices, 1);
    }
}
