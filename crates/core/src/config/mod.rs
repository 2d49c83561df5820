//! Scan configuration and output layout.
//!
//! `ScanConfig` is plain serde data with a default for every field, so a
//! config file only needs to name what it overrides. Files ending in
//! `.yaml`/`.yml` are read as YAML, everything else as JSON.

mod layout;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binary::DEFAULT_SIZE_RATIO_THRESHOLD;
use crate::patterns::{Decoding, RuleConfig, RuleError, RuleSet, TextExtensions};

pub use layout::{unit_stem, OutputLayout};

/// Per-entry size cap when unpacking archives (512 MiB).
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Rules(#[from] RuleError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Schema version of this config format.
    pub config_version: String,
    /// Where extracted trees and per-unit reports go.
    pub output_dir: String,
    /// Batch runs pick up files with this extension.
    pub unit_extension: String,
    /// Image size ratio above which an asset is flagged.
    pub size_ratio_threshold: f64,
    pub decoding: Decoding,
    pub text_extensions: TextExtensions,
    /// Non-text files with these extensions are classified and reported.
    pub firmware_extensions: Vec<String>,
    /// Literal markers counted inside image assets.
    pub image_markers: Vec<String>,
    pub max_entry_bytes: u64,
    pub rules: RuleConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            config_version: "0.1.0".to_string(),
            output_dir: "scan_results".to_string(),
            unit_extension: "apk".to_string(),
            size_ratio_threshold: DEFAULT_SIZE_RATIO_THRESHOLD,
            decoding: Decoding::default(),
            text_extensions: TextExtensions::default(),
            firmware_extensions: ["bin", "img", "hex", "fw"].map(String::from).to_vec(),
            image_markers: ["FIRMWARE", "UPDATE", "VERSION", ".bin", ".hex", ".img"]
                .map(String::from)
                .to_vec(),
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
            rules: RuleConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load from a JSON or YAML file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = Self::parse(path, &body)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn parse(path: &Path, body: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let parsed = if matches!(ext, "yaml" | "yml") {
            serde_yaml::from_str(body).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(body).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse { path: path.to_path_buf(), message })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.size_ratio_threshold.is_finite() && self.size_ratio_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "size_ratio_threshold must be a positive number, got {}",
                self.size_ratio_threshold
            )));
        }
        if self.unit_extension.trim().is_empty() {
            return Err(ConfigError::Invalid("unit_extension must not be empty".into()));
        }
        if self.max_entry_bytes == 0 {
            return Err(ConfigError::Invalid("max_entry_bytes must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn compile_rules(&self) -> Result<RuleSet, ConfigError> {
        Ok(self.rules.compile()?)
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output_dir)
    }

    pub fn is_firmware_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.firmware_extensions.iter().any(|f| f.eq_ignore_ascii_case(ext))
    }

    /// Whether `path` is a scan unit for batch runs.
    pub fn is_unit(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.unit_extension.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firmware_extensions_ignore_case() {
        let config = ScanConfig::default();
        assert!(config.is_firmware_extension(Path::new("assets/ota/ES210.BIN")));
        assert!(!config.is_firmware_extension(Path::new("assets/logo.png")));
    }

    #[test]
    fn unit_extension_is_case_sensitive() {
        let config = ScanConfig::default();
        assert!(config.is_unit(Path::new("app.apk")));
        assert!(!config.is_unit(Path::new("app.APK")));
    }
}
