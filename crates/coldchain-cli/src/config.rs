//! # Ledger Configuration Loading
//!
//! Reads a [`LedgerConfig`] from the YAML file named by `--config`. With no
//! file the defaults apply.

use std::path::Path;

use anyhow::{Context, Result};
use coldchain_ledger::LedgerConfig;

/// Load the ledger configuration, or the default when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    let Some(path) = path else {
        return Ok(LedgerConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: LedgerConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("invalid ledger config in {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        status_order = ?config.status_order,
        signature_check = ?config.signature_check,
        "loaded ledger config"
    );
    Ok(config)
}
