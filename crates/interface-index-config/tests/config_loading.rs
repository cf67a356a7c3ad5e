//! Config file loading tests for interface-index-config.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]
// crates/interface-index-config/tests/config_loading.rs
// =============================================================================
// Module: Config Loading Tests
// Description: Validate file reading limits and load-time validation.
// Purpose: Ensure untrusted config files fail closed before use.
// =============================================================================

use std::fs;

use interface_index_config::ConfigError;
use interface_index_config::InterfaceIndexConfig;
use interface_index_config::MAX_CONFIG_FILE_SIZE;
use interface_index_config::StoreType;

type TestResult = Result<(), String>;

#[test]
fn load_reads_and_validates_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("interface-index.toml");
    let db = dir.path().join("index.db");
    let body = format!("[store]\ntype = \"sqlite\"\npath = \"{}\"\n", db.display());
    fs::write(&path, body).map_err(|err| err.to_string())?;
    let config = InterfaceIndexConfig::load(Some(path.as_path())).map_err(|err| err.to_string())?;
    if config.store.store_type != StoreType::Sqlite
        || config.store.path.as_deref() != Some(db.as_path())
    {
        return Err("store section not loaded".to_string());
    }
    Ok(())
}

#[test]
fn missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    match InterfaceIndexConfig::load(Some(dir.path().join("absent.toml").as_path())) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("big.toml");
    let padding = format!("# {}\n", "x".repeat(MAX_CONFIG_FILE_SIZE));
    fs::write(&path, padding).map_err(|err| err.to_string())?;
    match InterfaceIndexConfig::load(Some(path.as_path())) {
        Err(ConfigError::Invalid(message)) if message.contains("size limit") => Ok(()),
        other => Err(format!("expected size error, got {other:?}")),
    }
}

#[test]
fn non_utf8_file_is_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("bad.toml");
    fs::write(&path, [0xff, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    match InterfaceIndexConfig::load(Some(path.as_path())) {
        Err(ConfigError::Invalid(message)) if message.contains("utf-8") => Ok(()),
        other => Err(format!("expected utf-8 error, got {other:?}")),
    }
}

#[test]
fn malformed_toml_is_parse_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[server\nbind = ").map_err(|err| err.to_string())?;
    match InterfaceIndexConfig::load(Some(path.as_path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn load_runs_validation() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("invalid.toml");
    fs::write(&path, "[auth]\nmode = \"bearer_token\"\n").map_err(|err| err.to_string())?;
    match InterfaceIndexConfig::load(Some(path.as_path())) {
        Err(ConfigError::Invalid(message)) if message.contains("requires tokens") => Ok(()),
        other => Err(format!("expected validation error, got {other:?}")),
    }
}

#[test]
fn overlong_path_component_is_rejected() -> TestResult {
    let path = std::path::PathBuf::from(format!("{}.toml", "c".repeat(300)));
    match InterfaceIndexConfig::load(Some(path.as_path())) {
        Err(ConfigError::Invalid(message)) if message.contains("component too long") => Ok(()),
        other => Err(format!("expected path error, got {other:?}")),
    }
}
