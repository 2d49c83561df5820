use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::report::Report;

use super::scan::{unit_name, ScanError, UnitScanner};
use super::write_json;

/// Outcome of one unit within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOutcome {
    pub apk: String,
    #[serde(flatten)]
    pub status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Success { report: Report },
    Failed { error: String, error_kind: String },
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, UnitStatus::Success { .. })
    }

    pub fn report(&self) -> Option<&Report> {
        match &self.status {
            UnitStatus::Success { report } => Some(report),
            UnitStatus::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_passwords: usize,
    pub total_urls: usize,
    pub total_backends: usize,
    pub successful_scans: usize,
    pub failed_scans: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[UnitOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            match outcome.report() {
                Some(report) => {
                    acc.total_passwords += report.summary.passwords_found;
                    acc.total_urls += report.summary.urls_found;
                    acc.total_backends += report.summary.backends_found;
                    acc.successful_scans += 1;
                }
                None => acc.failed_scans += 1,
            }
            acc
        })
    }
}

/// Combined batch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub scan_date: String,
    pub directory: String,
    pub total_apks: usize,
    pub scans: Vec<UnitOutcome>,
    pub summary: BatchSummary,
}

impl BatchResult {
    pub fn write_json(&self, path: &Path) -> Result<(), ScanError> {
        write_json(path, self)
    }
}

/// Drives a [`UnitScanner`] over every unit in a directory, one at a time.
pub struct BatchOrchestrator<'a> {
    scanner: UnitScanner<'a>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(scanner: UnitScanner<'a>) -> Self {
        Self { scanner }
    }

    pub fn scanner(&self) -> &UnitScanner<'a> {
        &self.scanner
    }

    /// Files directly inside `dir` carrying the unit extension, sorted by name.
    pub fn collect_units(&self, dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let entries = fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))?;
        let mut units = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ScanError::io(dir, e))?.path();
            if path.is_file() && self.scanner.config.is_unit(&path) {
                units.push(path);
            }
        }
        units.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(units)
    }

    pub fn run(&self, dir: &Path) -> Result<BatchResult, ScanError> {
        let units = self.collect_units(dir)?;
        Ok(self.run_units(&dir.display().to_string(), &units))
    }

    /// Scan `units` in order. A failing unit is recorded and the batch moves on.
    pub fn run_units(&self, directory: &str, units: &[PathBuf]) -> BatchResult {
        let total = units.len();
        let mut scans = Vec::with_capacity(total);
        for (idx, unit) in units.iter().enumerate() {
            let apk = unit_name(unit);
            tracing::info!(unit = %apk, "[{}/{}] scanning", idx + 1, total);
            let status = match self.scanner.scan_unit(unit) {
                Ok(report) => UnitStatus::Success { report },
                Err(err) => {
                    tracing::warn!(unit = %apk, kind = err.kind(), error = %err, "unit failed");
                    UnitStatus::Failed {
                        error: err.to_string(),
                        error_kind: err.kind().to_string(),
                    }
                }
            };
            scans.push(UnitOutcome { apk, status });
        }

        let summary = BatchSummary::from_outcomes(&scans);
        BatchResult {
            scan_date: Utc::now().to_rfc3339(),
            directory: directory.to_string(),
            total_apks: total,
            scans,
            summary,
        }
    }
}
