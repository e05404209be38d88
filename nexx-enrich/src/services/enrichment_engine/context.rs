//! Run-scoped mutable state shared by the passes
//!
//! Single writer (the run itself), so no locking.

use crate::models::{EnrichmentChange, EnrichmentError};
use std::collections::HashSet;
use tracing::{debug, warn};

pub struct RunContext {
    max_changes: usize,
    changes: Vec<EnrichmentChange>,
    errors: Vec<EnrichmentError>,
    /// Component ids proposed earlier in this run, applied or not
    staged_components: HashSet<String>,
}

impl RunContext {
    pub fn new(max_changes: usize) -> Self {
        Self {
            max_changes,
            changes: Vec::new(),
            errors: Vec::new(),
            staged_components: HashSet::new(),
        }
    }

    /// True once the change budget is spent; checked before every proposal
    pub fn reached_limit(&self) -> bool {
        self.changes.len() >= self.max_changes
    }

    pub fn remaining_budget(&self) -> usize {
        self.max_changes.saturating_sub(self.changes.len())
    }

    pub fn record(&mut self, change: EnrichmentChange) {
        debug!(
            action = %change.action,
            item = %change.target,
            field = %change.field,
            source = %change.source,
            "Proposed change"
        );
        self.changes.push(change);
    }

    pub fn stage_component(&mut self, ic_number: &str) {
        self.staged_components.insert(ic_number.to_string());
    }

    pub fn is_staged(&self, ic_number: &str) -> bool {
        self.staged_components.contains(ic_number)
    }

    pub fn record_error(&mut self, target: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(pass = target, "Enrichment pass failed: {}", message);
        self.errors.push(EnrichmentError::new(target, message));
    }

    /// Convert a pass result into an error entry if it failed
    pub fn settle<E: std::fmt::Display>(&mut self, pass: &str, result: Result<(), E>) {
        if let Err(e) = result {
            self.record_error(pass, e.to_string());
        }
    }

    pub fn changes(&self) -> &[EnrichmentChange] {
        &self.changes
    }

    pub fn errors(&self) -> &[EnrichmentError] {
        &self.errors
    }

    pub fn max_changes(&self) -> usize {
        self.max_changes
    }

    pub fn into_parts(self) -> (Vec<EnrichmentChange>, Vec<EnrichmentError>) {
        (self.changes, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeAction;

    fn change(target: &str) -> EnrichmentChange {
        EnrichmentChange::new(ChangeAction::Enrich, target, "brand", None, "Apple", "name-inference")
    }

    #[test]
    fn test_budget() {
        let mut ctx = RunContext::new(2);
        assert!(!ctx.reached_limit());
        assert_eq!(ctx.remaining_budget(), 2);

        ctx.record(change("a"));
        ctx.record(change("b"));
        assert!(ctx.reached_limit());
        assert_eq!(ctx.remaining_budget(), 0);
    }

    #[test]
    fn test_zero_budget_is_immediately_reached() {
        assert!(RunContext::new(0).reached_limit());
    }

    #[test]
    fn test_settle_records_only_failures() {
        let mut ctx = RunContext::new(5);
        ctx.settle::<String>("cross-reference", Ok(()));
        ctx.settle("fill-ics", Err("no such table: devices".to_string()));

        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.errors()[0].target, "fill-ics");
        assert_eq!(ctx.errors()[0].message, "no such table: devices");
    }

    #[test]
    fn test_staging() {
        let mut ctx = RunContext::new(5);
        assert!(!ctx.is_staged("U2300"));
        ctx.stage_component("U2300");
        assert!(ctx.is_staged("U2300"));
    }
}
