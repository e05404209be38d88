//! Pass 2: GAP-FILL
//!
//! Devices missing charging IC or power IC are matched against the device
//! component map; each of charging IC, power IC and audio codec is filled
//! independently when the map has a value and the device field is empty.

use super::{EnrichmentEngine, RunContext};
use crate::catalog::find_device_components;
use crate::db::DeviceField;
use crate::error::Result;
use crate::models::{ChangeAction, EnrichmentChange};
use nexx_common::db::is_missing;
use tracing::info;

pub const GAP_FILL_SOURCE: &str = "ic-mapping";

/// Stored form of a filled value: list columns get a one-element JSON list
fn stored_value(field: DeviceField, value: &str) -> Result<String> {
    match field {
        DeviceField::PowerIcs | DeviceField::AudioIcs => Ok(serde_json::to_string(&[value])?),
        _ => Ok(value.to_string()),
    }
}

impl EnrichmentEngine {
    pub(super) async fn phase_gap_fill(&self, ctx: &mut RunContext) -> Result<()> {
        if ctx.reached_limit() {
            return Ok(());
        }

        let devices = self
            .store
            .devices_missing_core_ics(self.options.gap_fill_sample)
            .await?;
        let before = ctx.changes().len();
        let mut unmatched = 0usize;

        'devices: for device in &devices {
            let Some(mapping) = find_device_components(&device.name) else {
                unmatched += 1;
                continue;
            };

            let candidates = [
                (DeviceField::ChargingIc, mapping.charging_ic, &device.charging_ic),
                (DeviceField::PowerIcs, mapping.power_ic, &device.power_ics),
                (DeviceField::AudioIcs, mapping.audio_codec, &device.audio_ics),
            ];

            for (field, mapped, current) in candidates {
                let Some(value) = mapped else {
                    continue;
                };
                if !is_missing(current.as_deref()) {
                    continue;
                }
                if ctx.reached_limit() {
                    break 'devices;
                }

                let change = EnrichmentChange::new(
                    ChangeAction::Enrich,
                    &device.name,
                    field.column(),
                    current.clone(),
                    value,
                    GAP_FILL_SOURCE,
                );

                if !self.options.dry_run {
                    let stored = stored_value(field, value)?;
                    self.store
                        .update_device_field(&device.name, field, Some(&stored))
                        .await?;
                }

                ctx.record(change);
            }
        }

        info!(
            devices = devices.len(),
            unmatched = unmatched,
            proposals = ctx.changes().len() - before,
            remaining = ctx.remaining_budget(),
            "Gap-fill pass finished"
        );
        Ok(())
    }
}
