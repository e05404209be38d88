//! Enrichment services
//!
//! - `enrichment_engine`: one bounded run of the four passes
//! - `control`: pause flag, last run and status for operators
//! - `audit`: change history, activity feed and run revert

pub mod audit;
pub mod control;
pub mod enrichment_engine;

pub use audit::{history, recent_activity, revert_run, FEED_TTL};
pub use control::{is_paused, last_run, pause, resume, status};
pub use enrichment_engine::{EngineOptions, EnrichmentEngine};
