//! Database models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Literal marker some importers write for an empty IC list
pub const EMPTY_LIST_MARKER: &str = "[]";

/// True if a text field counts as missing: NULL, empty string, or `"[]"`
pub fn is_missing(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.is_empty() || v == EMPTY_LIST_MARKER,
    }
}

/// Device record as stored in the `devices` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeviceRecord {
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub year: Option<i64>,
    pub charging_ic: Option<String>,
    pub power_ics: Option<String>,
    pub audio_ics: Option<String>,
    pub board_numbers: Option<String>,
    pub connector_type: Option<String>,
}

/// Row of the `ic_reference` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentReference {
    pub ic_number: String,
    pub ic_type: String,
    pub manufacturer: String,
    pub function: String,
    pub used_in: Vec<String>,
}

/// Row of the `enrichment_log` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentLogEntry {
    pub id: i64,
    pub run_id: String,
    pub action: String,
    pub target: String,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub source: String,
    pub created_at: String,
    pub reverted: bool,
}
