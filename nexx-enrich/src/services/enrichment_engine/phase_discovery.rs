//! Pass 3: DISCOVERY
//!
//! Every entry of the known-components table that the reference store lacks
//! is proposed as `ic_add`. Components staged by cross-reference earlier in
//! the run count as present, so dry run and apply propose the same set.

use super::{EnrichmentEngine, RunContext};
use crate::catalog::KNOWN_COMPONENTS;
use crate::error::Result;
use crate::models::{ChangeAction, EnrichmentChange};
use tracing::info;

pub const DISCOVERY_SOURCE: &str = "known-ics";

impl EnrichmentEngine {
    pub(super) async fn phase_discovery(&self, ctx: &mut RunContext) -> Result<()> {
        let before = ctx.changes().len();
        let mut present = 0usize;

        for known in KNOWN_COMPONENTS {
            if ctx.reached_limit() {
                break;
            }

            if ctx.is_staged(known.ic_number) || self.store.component_exists(known.ic_number).await? {
                present += 1;
                continue;
            }

            let change = EnrichmentChange::new(
                ChangeAction::IcAdd,
                known.ic_number,
                "ic_reference",
                None,
                format!("{}: {} ({})", known.ic_type, known.function, known.manufacturer),
                DISCOVERY_SOURCE,
            );

            if !self.options.dry_run {
                self.store
                    .insert_component_if_absent(&known.to_reference())
                    .await?;
            }

            ctx.stage_component(known.ic_number);
            ctx.record(change);
        }

        info!(
            known = KNOWN_COMPONENTS.len(),
            present = present,
            proposals = ctx.changes().len() - before,
            remaining = ctx.remaining_budget(),
            "Discovery pass finished"
        );
        Ok(())
    }
}
