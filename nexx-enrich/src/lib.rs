//! # nexx-enrich
//!
//! Bounded enrichment of the NEXX repair knowledge base.
//!
//! A run cross-references component ids already mentioned on devices, fills
//! missing IC fields from a curated device map, seeds the component reference
//! from a known-components table, and infers missing brand and category from
//! device names. Dry run is the default; applied runs keep an audit trail that
//! `services::revert_run` can undo.

pub mod catalog;
pub mod db;
pub mod error;
pub mod inference;
pub mod models;
pub mod services;

pub use db::{RecordStore, SqliteRecordStore};
pub use error::{EnrichError, Result};
pub use models::{EngineStatus, EnrichmentChange, EnrichmentError, EnrichmentRun, EnrichmentStats, RevertReport};
pub use services::{EngineOptions, EnrichmentEngine};
