//! SQLite implementation of `RecordStore`

use super::{CountMetric, DeviceField, RecordStore};
use crate::error::Result;
use crate::models::EnrichmentChange;
use async_trait::async_trait;
use nexx_common::db::{ComponentReference, DeviceRecord, EnrichmentLogEntry};
use sqlx::SqlitePool;

const DEVICE_COLUMNS: &str =
    "name, brand, category, year, charging_ic, power_ics, audio_ics, board_numbers, connector_type";

/// `RecordStore` over the shared knowledge-base database
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }
}

/// `column IS NULL OR column = '' OR column = '[]'`
fn missing(column: &str) -> String {
    format!("({c} IS NULL OR {c} = '' OR {c} = '[]')", c = column)
}

fn count_sql(metric: CountMetric) -> String {
    match metric {
        CountMetric::TotalDevices => "SELECT count(*) FROM devices".to_string(),
        CountMetric::TotalIcs => "SELECT count(*) FROM ic_reference".to_string(),
        CountMetric::TotalErrorCodes => "SELECT count(*) FROM error_codes".to_string(),
        CountMetric::TotalBoards => "SELECT count(*) FROM logic_boards".to_string(),
        CountMetric::MissingChargingIc => {
            format!("SELECT count(*) FROM devices WHERE {}", missing("charging_ic"))
        }
        CountMetric::MissingPowerIc => {
            format!("SELECT count(*) FROM devices WHERE {}", missing("power_ics"))
        }
        CountMetric::MissingAudioCodec => {
            format!("SELECT count(*) FROM devices WHERE {}", missing("audio_ics"))
        }
        CountMetric::MissingBoardNumber => {
            format!("SELECT count(*) FROM devices WHERE {}", missing("board_numbers"))
        }
        CountMetric::MissingCategory => {
            format!("SELECT count(*) FROM devices WHERE {}", missing("category"))
        }
        CountMetric::MissingBrand => {
            format!("SELECT count(*) FROM devices WHERE {}", missing("brand"))
        }
        CountMetric::MissingYear => {
            "SELECT count(*) FROM devices WHERE year IS NULL OR year = 0".to_string()
        }
        CountMetric::MissingConnector => {
            format!("SELECT count(*) FROM devices WHERE {}", missing("connector_type"))
        }
        CountMetric::DevicesWithNoIcs => format!(
            "SELECT count(*) FROM devices WHERE {} AND {} AND {}",
            missing("charging_ic"),
            missing("power_ics"),
            missing("audio_ics")
        ),
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn count(&self, metric: CountMetric) -> Result<u64> {
        let sql = count_sql(metric);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn devices_with_ics(&self, limit: u32) -> Result<Vec<DeviceRecord>> {
        let sql = format!(
            "SELECT {} FROM devices WHERE NOT {} OR NOT {} OR NOT {} ORDER BY id LIMIT ?",
            DEVICE_COLUMNS,
            missing("charging_ic"),
            missing("power_ics"),
            missing("audio_ics")
        );
        let devices = sqlx::query_as::<_, DeviceRecord>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(devices)
    }

    async fn devices_missing_core_ics(&self, limit: u32) -> Result<Vec<DeviceRecord>> {
        let sql = format!(
            "SELECT {} FROM devices WHERE {} OR {} ORDER BY id LIMIT ?",
            DEVICE_COLUMNS,
            missing("charging_ic"),
            missing("power_ics")
        );
        let devices = sqlx::query_as::<_, DeviceRecord>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(devices)
    }

    async fn devices_missing(
        &self,
        field: DeviceField,
        limit: u32,
    ) -> Result<Vec<(String, Option<String>)>> {
        let column = field.column();
        let sql = format!(
            "SELECT name, {} FROM devices WHERE {} ORDER BY id LIMIT ?",
            column,
            missing(column)
        );
        let rows = sqlx::query_as::<_, (String, Option<String>)>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn component_exists(&self, ic_number: &str) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT ic_number FROM ic_reference WHERE ic_number = ?")
                .bind(ic_number)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert_component_if_absent(&self, component: &ComponentReference) -> Result<bool> {
        let used_in = serde_json::to_string(&component.used_in)?;
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO ic_reference (ic_number, ic_type, manufacturer, function, used_in)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&component.ic_number)
        .bind(&component.ic_type)
        .bind(&component.manufacturer)
        .bind(&component.function)
        .bind(used_in)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_device_field(
        &self,
        name: &str,
        field: DeviceField,
        value: Option<&str>,
    ) -> Result<()> {
        let sql = format!("UPDATE devices SET {} = ? WHERE name = ?", field.column());
        sqlx::query(&sql)
            .bind(value)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_component(&self, ic_number: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ic_reference WHERE ic_number = ?")
            .bind(ic_number)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_log(&self, run_id: &str, changes: &[EnrichmentChange]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for change in changes {
            sqlx::query(
                r#"
                INSERT INTO enrichment_log (run_id, action, target, field, old_value, new_value, source, created_at, reverted)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)
                "#,
            )
            .bind(run_id)
            .bind(change.action.as_str())
            .bind(&change.target)
            .bind(&change.field)
            .bind(&change.old_value)
            .bind(&change.new_value)
            .bind(&change.source)
            .bind(&change.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn mark_run_reverted(&self, run_id: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE enrichment_log SET reverted = 1 WHERE run_id = ?")
            .bind(run_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn recent_log(&self, limit: u32) -> Result<Vec<EnrichmentLogEntry>> {
        if !self.table_exists("enrichment_log").await? {
            return Ok(Vec::new());
        }

        let entries = sqlx::query_as::<_, EnrichmentLogEntry>(
            r#"
            SELECT id, run_id, action, target, field, old_value, new_value, source, created_at, reverted
            FROM enrichment_log
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
