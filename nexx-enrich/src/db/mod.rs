//! Record store access for the enrichment engine
//!
//! `RecordStore` is the engine's only view of the knowledge base. Each method
//! is one bounded query; there are no retries here.

pub mod sqlite_store;

pub use sqlite_store::SqliteRecordStore;

use crate::error::{EnrichError, Result};
use crate::models::EnrichmentChange;
use async_trait::async_trait;
use nexx_common::db::{ComponentReference, DeviceRecord, EnrichmentLogEntry};
use std::fmt;
use std::str::FromStr;

/// Device columns the engine may write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceField {
    ChargingIc,
    PowerIcs,
    AudioIcs,
    Brand,
    Category,
}

impl DeviceField {
    /// Column name; also the `field` value of change records
    pub fn column(&self) -> &'static str {
        match self {
            DeviceField::ChargingIc => "charging_ic",
            DeviceField::PowerIcs => "power_ics",
            DeviceField::AudioIcs => "audio_ics",
            DeviceField::Brand => "brand",
            DeviceField::Category => "category",
        }
    }
}

impl fmt::Display for DeviceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for DeviceField {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "charging_ic" => Ok(DeviceField::ChargingIc),
            "power_ics" => Ok(DeviceField::PowerIcs),
            "audio_ics" => Ok(DeviceField::AudioIcs),
            "brand" => Ok(DeviceField::Brand),
            "category" => Ok(DeviceField::Category),
            other => Err(EnrichError::Unrevertable(format!("unknown device field '{}'", other))),
        }
    }
}

/// One completeness count; each maps to a single `SELECT count(*)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountMetric {
    TotalDevices,
    TotalIcs,
    TotalErrorCodes,
    TotalBoards,
    MissingChargingIc,
    MissingPowerIc,
    MissingAudioCodec,
    MissingBoardNumber,
    MissingCategory,
    MissingBrand,
    MissingYear,
    MissingConnector,
    DevicesWithNoIcs,
}

impl CountMetric {
    pub const ALL: [CountMetric; 13] = [
        CountMetric::TotalDevices,
        CountMetric::TotalIcs,
        CountMetric::TotalErrorCodes,
        CountMetric::TotalBoards,
        CountMetric::MissingChargingIc,
        CountMetric::MissingPowerIc,
        CountMetric::MissingAudioCodec,
        CountMetric::MissingBoardNumber,
        CountMetric::MissingCategory,
        CountMetric::MissingBrand,
        CountMetric::MissingYear,
        CountMetric::MissingConnector,
        CountMetric::DevicesWithNoIcs,
    ];
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count(&self, metric: CountMetric) -> Result<u64>;

    /// Devices with at least one non-missing IC field, in insertion order
    async fn devices_with_ics(&self, limit: u32) -> Result<Vec<DeviceRecord>>;

    /// Devices missing charging IC or power IC, in insertion order
    async fn devices_missing_core_ics(&self, limit: u32) -> Result<Vec<DeviceRecord>>;

    /// `(name, current raw value)` of devices where `field` is missing
    async fn devices_missing(
        &self,
        field: DeviceField,
        limit: u32,
    ) -> Result<Vec<(String, Option<String>)>>;

    async fn component_exists(&self, ic_number: &str) -> Result<bool>;

    /// Insert unless the identifier exists; returns whether a row was written
    async fn insert_component_if_absent(&self, component: &ComponentReference) -> Result<bool>;

    /// Targeted single-column update; `None` writes NULL
    async fn update_device_field(
        &self,
        name: &str,
        field: DeviceField,
        value: Option<&str>,
    ) -> Result<()>;

    /// Used only by revert
    async fn delete_component(&self, ic_number: &str) -> Result<bool>;

    /// Append to the optional change log; fails if the log table is absent
    async fn append_log(&self, run_id: &str, changes: &[EnrichmentChange]) -> Result<()>;

    async fn mark_run_reverted(&self, run_id: &str) -> Result<u64>;

    /// Newest log rows first; empty if the log table is absent
    async fn recent_log(&self, limit: u32) -> Result<Vec<EnrichmentLogEntry>>;
}
