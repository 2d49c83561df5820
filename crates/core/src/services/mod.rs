pub mod batch;
pub mod extract;
pub mod scan;

use std::fs;
use std::path::Path;

use serde::Serialize;

pub use batch::{BatchOrchestrator, BatchResult, BatchSummary, UnitOutcome, UnitStatus};
pub use extract::{ExtractionError, ExtractionSummary, Extractor, ZipExtractor};
pub use scan::{unit_name, AssetError, ScanError, UnitScanner};

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ScanError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ScanError::io(parent, e))?;
    }
    let body = serde_json::to_string_pretty(value)
        .map_err(|source| ScanError::Serialize { path: path.to_path_buf(), source })?;
    fs::write(path, body).map_err(|e| ScanError::io(path, e))
}
