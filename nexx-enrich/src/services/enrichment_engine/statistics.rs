//! Store completeness statistics
//!
//! Read-only. All thirteen counts are issued concurrently and joined; any
//! single failure fails the whole collection.

use crate::db::{CountMetric, RecordStore};
use crate::error::Result;
use crate::models::EnrichmentStats;
use futures::future::try_join_all;

/// Fields contributing to `database_health`
pub const TRACKED_FIELDS: u64 = 7;

pub async fn collect_stats(store: &dyn RecordStore) -> Result<EnrichmentStats> {
    let counts = try_join_all(CountMetric::ALL.iter().map(|metric| store.count(*metric))).await?;

    Ok(EnrichmentStats::from_counts(
        CountMetric::ALL.iter().copied().zip(counts),
    ))
}

/// `round(100 * filled / total)`; zero when there is nothing to measure
fn percentage(filled: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((filled as f64 / total as f64) * 100.0).round() as u32
}

pub fn database_health(total_devices: u64, missing_fields: u64) -> u32 {
    let total_fields = total_devices * TRACKED_FIELDS;
    percentage(total_fields.saturating_sub(missing_fields), total_fields)
}

pub fn ic_coverage(total_devices: u64, devices_with_no_ics: u64) -> u32 {
    percentage(total_devices.saturating_sub(devices_with_no_ics), total_devices)
}

impl EnrichmentStats {
    /// Build a snapshot from raw counts and compute the derived percentages
    pub fn from_counts(counts: impl IntoIterator<Item = (CountMetric, u64)>) -> Self {
        let mut stats = EnrichmentStats::default();

        for (metric, count) in counts {
            match metric {
                CountMetric::TotalDevices => stats.total_devices = count,
                CountMetric::TotalIcs => stats.total_ics = count,
                CountMetric::TotalErrorCodes => stats.total_errors = count,
                CountMetric::TotalBoards => stats.total_boards = count,
                CountMetric::MissingChargingIc => stats.missing_charging_ic = count,
                CountMetric::MissingPowerIc => stats.missing_power_ic = count,
                CountMetric::MissingAudioCodec => stats.missing_audio_codec = count,
                CountMetric::MissingBoardNumber => stats.missing_board_number = count,
                CountMetric::MissingCategory => stats.missing_category = count,
                CountMetric::MissingBrand => stats.missing_brand = count,
                CountMetric::MissingYear => stats.missing_year = count,
                CountMetric::MissingConnector => stats.missing_connector = count,
                CountMetric::DevicesWithNoIcs => stats.devices_with_no_ics = count,
            }
        }

        // Connector type is counted but not part of the health score
        let missing_fields = stats.missing_charging_ic
            + stats.missing_power_ic
            + stats.missing_audio_codec
            + stats.missing_board_number
            + stats.missing_category
            + stats.missing_brand
            + stats.missing_year;

        stats.database_health = database_health(stats.total_devices, missing_fields);
        stats.ic_coverage = ic_coverage(stats.total_devices, stats.devices_with_no_ics);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_devices() {
        assert_eq!(database_health(0, 0), 0);
        assert_eq!(ic_coverage(0, 0), 0);

        let stats = EnrichmentStats::from_counts(CountMetric::ALL.iter().map(|m| (*m, 0)));
        assert_eq!(stats.database_health, 0);
        assert_eq!(stats.ic_coverage, 0);
    }

    #[test]
    fn test_health_rounding() {
        // 3 devices = 21 fields, 2 missing => 90.47 => 90
        assert_eq!(database_health(3, 2), 90);
        // 1 device = 7 fields, 1 missing => 85.71 => 86
        assert_eq!(database_health(1, 1), 86);
        assert_eq!(database_health(4, 0), 100);
        assert_eq!(database_health(4, 28), 0);
    }

    #[test]
    fn test_coverage() {
        assert_eq!(ic_coverage(3, 1), 67);
        assert_eq!(ic_coverage(8, 8), 0);
    }

    #[test]
    fn test_connector_excluded_from_health() {
        let stats = EnrichmentStats::from_counts([
            (CountMetric::TotalDevices, 2),
            (CountMetric::MissingConnector, 2),
        ]);
        assert_eq!(stats.missing_connector, 2);
        assert_eq!(stats.database_health, 100);
        assert_eq!(stats.ic_coverage, 100);
    }
}
