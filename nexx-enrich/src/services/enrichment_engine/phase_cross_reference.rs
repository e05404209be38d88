//! Pass 1: CROSS-REFERENCE
//!
//! Component ids mentioned in device IC fields that the known table recognises
//! but the reference store lacks are proposed as `ic_add`.

use super::{EnrichmentEngine, RunContext};
use crate::catalog::known_component;
use crate::error::Result;
use crate::models::{ChangeAction, EnrichmentChange};
use nexx_common::db::is_missing;
use tracing::{debug, info};

/// Candidate component ids in a raw IC field value
///
/// A JSON list yields its non-empty elements. Anything else is split on
/// `,` `;` `|` or whitespace, keeping tokens longer than two characters.
pub fn extract_ic_numbers(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }

    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(value) {
        return items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect();
    }

    value
        .split(|c: char| c == ',' || c == ';' || c == '|' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| token.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

impl EnrichmentEngine {
    pub(super) async fn phase_cross_reference(&self, ctx: &mut RunContext) -> Result<()> {
        if ctx.reached_limit() {
            return Ok(());
        }

        let devices = self
            .store
            .devices_with_ics(self.options.cross_reference_sample)
            .await?;
        let before = ctx.changes().len();

        'devices: for device in &devices {
            let fields = [
                ("charging_ic", device.charging_ic.as_deref()),
                ("power_ics", device.power_ics.as_deref()),
                ("audio_ics", device.audio_ics.as_deref()),
            ];

            for (field, value) in fields {
                if is_missing(value) {
                    continue;
                }

                for ic_number in extract_ic_numbers(value.unwrap_or_default()) {
                    if ctx.reached_limit() {
                        break 'devices;
                    }

                    let Some(known) = known_component(&ic_number) else {
                        continue;
                    };
                    if ctx.is_staged(&ic_number) || self.store.component_exists(&ic_number).await? {
                        continue;
                    }

                    let change = EnrichmentChange::new(
                        ChangeAction::IcAdd,
                        &ic_number,
                        "ic_reference",
                        None,
                        format!("{}: {}", known.ic_type, known.function),
                        format!("cross-ref:{}", device.name),
                    );

                    if !self.options.dry_run {
                        self.store
                            .insert_component_if_absent(&known.to_reference())
                            .await?;
                    }

                    debug!(device = %device.name, field = field, ic = %ic_number, "Cross-referenced component");
                    ctx.stage_component(&ic_number);
                    ctx.record(change);
                }
            }
        }

        info!(
            devices = devices.len(),
            proposals = ctx.changes().len() - before,
            remaining = ctx.remaining_budget(),
            "Cross-reference pass finished"
        );
        Ok(())
    }
}
