//! Console config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use maas_policy_core::error::{PolicyError, Result};

pub use schema::{ConsoleConfig, ConsoleSection, LiveSection, SimulatorSection};

pub fn load_from_file(path: &str) -> Result<ConsoleConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PolicyError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

/// Like [`load_from_file`], but a missing file yields the defaults.
pub fn load_or_default(path: &str) -> Result<ConsoleConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            let cfg = ConsoleConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
        Err(e) => Err(PolicyError::Internal(format!("read config failed: {e}"))),
    }
}

pub fn load_from_str(s: &str) -> Result<ConsoleConfig> {
    let cfg: ConsoleConfig = serde_yaml::from_str(s)
        .map_err(|e| PolicyError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
