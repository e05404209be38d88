//! Shared fixtures for nexx-enrich integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use nexx_common::db::init::init_database;
use nexx_common::db::{ComponentReference, DeviceRecord, EnrichmentLogEntry};
use nexx_common::SqliteCache;
use nexx_enrich::db::{CountMetric, DeviceField, RecordStore};
use nexx_enrich::{EngineOptions, EnrichError, EnrichmentChange, EnrichmentEngine, SqliteRecordStore};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

/// On-disk database with the full schema
///
/// The TempDir must outlive the pool.
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("nexx.db")).await.unwrap();
    (dir, pool)
}

pub fn options(dry_run: bool, max_changes: usize) -> EngineOptions {
    EngineOptions {
        dry_run,
        max_changes_per_run: max_changes,
        ..Default::default()
    }
}

pub fn engine(pool: &SqlitePool, options: EngineOptions) -> EnrichmentEngine {
    EnrichmentEngine::new(
        Arc::new(SqliteRecordStore::new(pool.clone())),
        Arc::new(SqliteCache::new(pool.clone())),
        options,
    )
}

/// Device row; IC fields are stored verbatim so `""` and `"[]"` can be seeded
#[derive(Debug, Clone, Default)]
pub struct Seed<'a> {
    pub name: &'a str,
    pub brand: Option<&'a str>,
    pub category: Option<&'a str>,
    pub charging_ic: Option<&'a str>,
    pub power_ics: Option<&'a str>,
    pub audio_ics: Option<&'a str>,
}

impl<'a> Seed<'a> {
    pub fn named(name: &'a str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

pub async fn seed(pool: &SqlitePool, device: Seed<'_>) {
    sqlx::query(
        "INSERT INTO devices (name, brand, category, charging_ic, power_ics, audio_ics)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(device.name)
    .bind(device.brand)
    .bind(device.category)
    .bind(device.charging_ic)
    .bind(device.power_ics)
    .bind(device.audio_ics)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn load_device(pool: &SqlitePool, name: &str) -> DeviceRecord {
    sqlx::query_as(
        "SELECT name, brand, category, year, charging_ic, power_ics, audio_ics, board_numbers, connector_type
         FROM devices WHERE name = ?",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn scalar(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
}

/// Comparable view of a change, without its timestamp
pub fn shape(change: &EnrichmentChange) -> (String, String, String, Option<String>, String, String) {
    (
        change.action.to_string(),
        change.target.clone(),
        change.field.clone(),
        change.old_value.clone(),
        change.new_value.clone(),
        change.source.clone(),
    )
}

/// Store method to break in `FailingStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Count,
    DevicesMissingCoreIcs,
}

/// Delegates to SQLite except for one method, which always fails
pub struct FailingStore {
    inner: SqliteRecordStore,
    fail: FailPoint,
}

impl FailingStore {
    pub fn new(pool: &SqlitePool, fail: FailPoint) -> Self {
        Self {
            inner: SqliteRecordStore::new(pool.clone()),
            fail,
        }
    }

    fn injected(&self, point: FailPoint) -> nexx_enrich::Result<()> {
        if self.fail == point {
            return Err(EnrichError::Database(sqlx::Error::Protocol(format!(
                "injected failure at {:?}",
                point
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn count(&self, metric: CountMetric) -> nexx_enrich::Result<u64> {
        self.injected(FailPoint::Count)?;
        self.inner.count(metric).await
    }

    async fn devices_with_ics(&self, limit: u32) -> nexx_enrich::Result<Vec<DeviceRecord>> {
        self.inner.devices_with_ics(limit).await
    }

    async fn devices_missing_core_ics(&self, limit: u32) -> nexx_enrich::Result<Vec<DeviceRecord>> {
        self.injected(FailPoint::DevicesMissingCoreIcs)?;
        self.inner.devices_missing_core_ics(limit).await
    }

    async fn devices_missing(
        &self,
        field: DeviceField,
        limit: u32,
    ) -> nexx_enrich::Result<Vec<(String, Option<String>)>> {
        self.inner.devices_missing(field, limit).await
    }

    async fn component_exists(&self, ic_number: &str) -> nexx_enrich::Result<bool> {
        self.inner.component_exists(ic_number).await
    }

    async fn insert_component_if_absent(&self, component: &ComponentReference) -> nexx_enrich::Result<bool> {
        self.inner.insert_component_if_absent(component).await
    }

    async fn update_device_field(
        &self,
        name: &str,
        field: DeviceField,
        value: Option<&str>,
    ) -> nexx_enrich::Result<()> {
        self.inner.update_device_field(name, field, value).await
    }

    async fn delete_component(&self, ic_number: &str) -> nexx_enrich::Result<bool> {
        self.inner.delete_component(ic_number).await
    }

    async fn append_log(&self, run_id: &str, changes: &[EnrichmentChange]) -> nexx_enrich::Result<()> {
        self.inner.append_log(run_id, changes).await
    }

    async fn mark_run_reverted(&self, run_id: &str) -> nexx_enrich::Result<u64> {
        self.inner.mark_run_reverted(run_id).await
    }

    async fn recent_log(&self, limit: u32) -> nexx_enrich::Result<Vec<EnrichmentLogEntry>> {
        self.inner.recent_log(limit).await
    }
}

pub fn failing_engine(pool: &SqlitePool, fail: FailPoint, options: EngineOptions) -> EnrichmentEngine {
    EnrichmentEngine::new(
        Arc::new(FailingStore::new(pool, fail)),
        Arc::new(SqliteCache::new(pool.clone())),
        options,
    )
}
