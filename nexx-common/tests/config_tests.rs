//! Tests for bootstrap configuration resolution
//!
//! Tests touching NEXX_* environment variables are marked #[serial] so they
//! don't race each other.

use nexx_common::config::{ConfigSource, TomlConfig, CONFIG_ENV_VAR, DATABASE_ENV_VAR};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[test]
fn test_defaults_when_document_is_empty() {
    let config = TomlConfig::from_toml_str("").unwrap();

    assert_eq!(config.database_path, None);
    assert_eq!(config.logging.level, "info");
    assert!(config.enrichment.dry_run);
    assert_eq!(config.enrichment.max_changes_per_run, 25);
    assert_eq!(config.enrichment.cross_reference_sample, 100);
    assert_eq!(config.enrichment.gap_fill_sample, 50);
    assert_eq!(config.enrichment.quality_sample, 20);
}

#[test]
fn test_partial_enrichment_table() {
    let config = TomlConfig::from_toml_str(
        r#"
        database_path = "/srv/nexx/nexx.db"

        [enrichment]
        dry_run = false
        max_changes_per_run = 60
        "#,
    )
    .unwrap();

    assert_eq!(config.database_path, Some(PathBuf::from("/srv/nexx/nexx.db")));
    assert!(!config.enrichment.dry_run);
    assert_eq!(config.enrichment.max_changes_per_run, 60);
    assert_eq!(config.enrichment.gap_fill_sample, 50);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = TomlConfig::from_toml_str("[enrichment\ndry_run = ").unwrap_err();
    assert!(matches!(err, nexx_common::Error::Config(_)));
}

#[test]
#[serial]
fn test_database_path_priority() {
    env::remove_var(DATABASE_ENV_VAR);
    let config = TomlConfig::from_toml_str(r#"database_path = "/from/toml.db""#).unwrap();

    // TOML beats default
    assert_eq!(config.database_path(None), PathBuf::from("/from/toml.db"));

    // ENV beats TOML
    env::set_var(DATABASE_ENV_VAR, "/from/env.db");
    assert_eq!(config.database_path(None), PathBuf::from("/from/env.db"));

    // CLI beats ENV
    assert_eq!(
        config.database_path(Some(Path::new("/from/cli.db"))),
        PathBuf::from("/from/cli.db")
    );

    env::remove_var(DATABASE_ENV_VAR);
}

#[test]
#[serial]
fn test_default_database_path_when_unconfigured() {
    env::remove_var(DATABASE_ENV_VAR);
    let config = TomlConfig::default();

    let path = config.database_path(None);
    assert!(path.ends_with("nexx.db"));
}

#[test]
#[serial]
fn test_resolve_prefers_cli_then_env() {
    let dir = TempDir::new().unwrap();
    let cli_file = dir.path().join("cli.toml");
    let env_file = dir.path().join("env.toml");
    std::fs::write(&cli_file, "[enrichment]\nmax_changes_per_run = 5\n").unwrap();
    std::fs::write(&env_file, "[enrichment]\nmax_changes_per_run = 7\n").unwrap();

    env::set_var(CONFIG_ENV_VAR, &env_file);

    let from_cli = TomlConfig::resolve(Some(&cli_file)).unwrap();
    assert_eq!(from_cli.enrichment.max_changes_per_run, 5);

    let from_env = TomlConfig::resolve(None).unwrap();
    assert_eq!(from_env.enrichment.max_changes_per_run, 7);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolve_missing_explicit_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let result = TomlConfig::resolve(Some(Path::new("/nonexistent/nexx/config.toml")));
    assert!(result.is_err());
}

/// Collects formatted log output for assertions
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Point the user config directory at an empty temp dir
fn isolate_config_dir(dir: &TempDir) {
    env::remove_var(CONFIG_ENV_VAR);
    env::set_var("XDG_CONFIG_HOME", dir.path());
    env::set_var("HOME", dir.path());
}

#[test]
#[serial]
fn test_locate_falls_back_to_built_in() {
    let dir = TempDir::new().unwrap();
    isolate_config_dir(&dir);

    // Skip on hosts with a system-wide config file
    if Path::new("/etc/nexx/config.toml").exists() {
        return;
    }

    let source = ConfigSource::locate(None);
    assert_eq!(source, ConfigSource::BuiltIn);
    let config = TomlConfig::from_source(&source).unwrap();
    assert_eq!(config.enrichment.max_changes_per_run, 25);
}

#[test]
#[serial]
fn test_locate_finds_user_config_file() {
    let dir = TempDir::new().unwrap();
    isolate_config_dir(&dir);
    let file = dir.path().join("nexx").join("config.toml");
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, "[logging]\nlevel = \"debug\"\n").unwrap();

    let source = ConfigSource::locate(None);
    assert_eq!(source, ConfigSource::DefaultFile(file));
    assert_eq!(TomlConfig::from_source(&source).unwrap().logging.level, "debug");
}

#[test]
#[serial]
fn test_built_in_fallback_warns_once_subscriber_is_installed() {
    let dir = TempDir::new().unwrap();
    isolate_config_dir(&dir);
    if Path::new("/etc/nexx/config.toml").exists() {
        return;
    }

    // Locating and loading happen before any subscriber exists
    let source = ConfigSource::locate(None);
    TomlConfig::from_source(&source).unwrap();

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || source.log());

    let text = logs.text();
    assert_eq!(text.matches("No config file found, using built-in defaults").count(), 1);
    assert!(text.contains("WARN"));
}
