//! Error types for nexx-enrich
//!
//! Pass code propagates these with `?`; the run controller converts them into
//! `EnrichmentError` records so they never escape `EnrichmentEngine::run`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnrichError>;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// nexx-common error (config, cache, schema)
    #[error(transparent)]
    Common(#[from] nexx_common::Error),

    /// Record store query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cached or audited payload could not be encoded/decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Engine options rejected before a run
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// No audit trail exists (expired, never written, or already reverted)
    #[error("No audit trail for run {0}")]
    AuditMissing(String),

    /// A change record could not be interpreted during revert
    #[error("Unrevertable change: {0}")]
    Unrevertable(String),
}
