//! Enrichment run data model
//!
//! JSON field names are camelCase because the persisted run, audit trail and
//! feed are read by the web dashboard.

use nexx_common::time::now_rfc3339;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation a change record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// Fill a missing device field
    Enrich,
    Discover,
    /// Insert a component reference row
    IcAdd,
    ErrorCodeAdd,
    CrossRef,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Enrich => "enrich",
            ChangeAction::Discover => "discover",
            ChangeAction::IcAdd => "ic_add",
            ChangeAction::ErrorCodeAdd => "error_code_add",
            ChangeAction::CrossRef => "cross_ref",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proposed or applied mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentChange {
    pub action: ChangeAction,
    /// Device name or component identifier
    pub target: String,
    pub field: String,
    /// Raw value before the change (`None` for NULL or for new rows)
    pub old_value: Option<String>,
    pub new_value: String,
    pub source: String,
    pub timestamp: String,
}

impl EnrichmentChange {
    pub fn new(
        action: ChangeAction,
        target: impl Into<String>,
        field: impl Into<String>,
        old_value: Option<String>,
        new_value: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            action,
            target: target.into(),
            field: field.into(),
            old_value,
            new_value: new_value.into(),
            source: source.into(),
            timestamp: now_rfc3339(),
        }
    }
}

/// A caught failure; the run continues past it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentError {
    /// Pass name, or `"engine"` for a whole-run failure
    pub target: String,
    pub message: String,
    pub timestamp: String,
}

impl EnrichmentError {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
            timestamp: now_rfc3339(),
        }
    }
}

/// Point-in-time completeness snapshot of the record store
///
/// `Default` is the all-zero snapshot used when stats cannot be collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentStats {
    pub total_devices: u64,
    #[serde(rename = "totalICs")]
    pub total_ics: u64,
    pub total_errors: u64,
    pub total_boards: u64,
    #[serde(rename = "missingChargingIC")]
    pub missing_charging_ic: u64,
    #[serde(rename = "missingPowerIC")]
    pub missing_power_ic: u64,
    pub missing_audio_codec: u64,
    pub missing_board_number: u64,
    pub missing_category: u64,
    pub missing_brand: u64,
    pub missing_year: u64,
    pub missing_connector: u64,
    #[serde(rename = "devicesWithNoICs")]
    pub devices_with_no_ics: u64,
    /// 0-100, share of the seven tracked fields that are filled
    pub database_health: u32,
    /// 0-100, share of devices with at least one IC field
    pub ic_coverage: u32,
}

/// Result of one engine invocation; immutable once returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRun {
    pub run_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub dry_run: bool,
    pub stats: EnrichmentStats,
    pub changes: Vec<EnrichmentChange>,
    pub errors: Vec<EnrichmentError>,
}

impl EnrichmentRun {
    /// True if no pass and no top-level step failed
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of reverting an applied run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertReport {
    pub run_id: String,
    pub restored_fields: usize,
    pub removed_components: usize,
    /// Change records that were skipped (unknown action or field)
    pub skipped: usize,
}

/// Operator view of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub paused: bool,
    pub last_run: Option<EnrichmentRun>,
    pub stats: EnrichmentStats,
}
