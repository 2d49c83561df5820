use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use sieve_core::config::ScanConfig;

pub mod commands;
pub mod logging;

pub use commands::*;

/// Load the scan config from `config` (JSON or YAML) or fall back to defaults,
/// then apply an `--output-dir` override.
pub fn load_scan_config(config: Option<&str>, output_dir: Option<&str>) -> Result<ScanConfig> {
    let mut scan_config = ScanConfig::load_or_default(config.map(Path::new))
        .with_context(|| format!("Failed to load config {}", config.unwrap_or("<defaults>")))?;
    if let Some(dir) = output_dir {
        scan_config.output_dir = dir.to_string();
    }
    Ok(scan_config)
}

/// Serialize `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T, what: &str) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {what} to JSON"))?;
    println!("{serialized}");
    Ok(())
}
