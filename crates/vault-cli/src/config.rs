use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use beacon_connect::request::EngineConfig;
use tracing::debug;

pub fn default_config_dir() -> PathBuf {
    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".vault-core")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("engine.json")
}

pub fn default_wallets_path() -> PathBuf {
    default_config_dir().join("wallets.json")
}

/// An explicit path must exist; the default path is optional.
pub fn load_engine_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    match explicit {
        Some(path) => read_engine_config(path),
        None => {
            let path = default_config_path();
            if path.exists() {
                read_engine_config(&path)
            } else {
                debug!("no engine config at {}; using defaults", path.display());
                Ok(EngineConfig::default())
            }
        }
    }
}

fn read_engine_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading engine config: {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("parsing engine config: {}", path.display()))?;
    debug!("engine config loaded from {}: {config:?}", path.display());
    Ok(config)
}

/// Returns `value` itself, or the contents of the file when it starts with `@`.
pub fn inline_or_file(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading file: {path}")),
        None => Ok(value.to_owned()),
    }
}
