//! Database initialization
//!
//! Creates the knowledge-base tables on first run and opens existing databases
//! without modification. Every `create_*` function is idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (or create) the database file and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the stats fan-out read while a pass holds the writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table used by the enrichment engine and cache
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_devices_table(pool).await?;
    create_ic_reference_table(pool).await?;
    create_error_codes_table(pool).await?;
    create_logic_boards_table(pool).await?;
    create_enrichment_log_table(pool).await?;
    create_kv_cache_table(pool).await?;
    Ok(())
}

/// Device knowledge records, keyed by unique name
///
/// IC columns hold either a JSON list, a delimited string, or one of the
/// empty markers (`NULL`, `''`, `'[]'`).
pub async fn create_devices_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS devices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            brand TEXT,
            category TEXT,
            year INTEGER,
            charging_ic TEXT,
            power_ics TEXT,
            audio_ics TEXT,
            board_numbers TEXT,
            connector_type TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Component reference table (insert-if-absent only from the engine)
pub async fn create_ic_reference_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ic_reference (
            ic_number TEXT PRIMARY KEY,
            ic_type TEXT,
            manufacturer TEXT,
            function TEXT,
            used_in TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_error_codes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS error_codes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL,
            platform TEXT,
            description TEXT,
            solution TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_logic_boards_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS logic_boards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            board_number TEXT NOT NULL,
            device_name TEXT,
            notes TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Durable, append-only change log
///
/// Optional: deployments may drop it, and writers must treat its absence as a no-op.
pub async fn create_enrichment_log_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrichment_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT NOT NULL,
            action TEXT NOT NULL,
            target TEXT NOT NULL,
            field TEXT NOT NULL,
            old_value TEXT,
            new_value TEXT NOT NULL,
            source TEXT NOT NULL,
            created_at TEXT NOT NULL,
            reverted INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_enrichment_log_run_id ON enrichment_log(run_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Key-value cache rows; `expires_at` NULL means no expiry
pub async fn create_kv_cache_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_cache (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            expires_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_kv_cache_expires_at ON kv_cache(expires_at)")
        .execute(pool)
        .await?;

    Ok(())
}
