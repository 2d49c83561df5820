use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::binary::{classify, inspect_image, FormatError, PNG_SIGNATURE, SIGNATURE_WINDOW};
use crate::config::{ConfigError, OutputLayout, ScanConfig};
use crate::patterns::{decode_text, PatternExtractor};
use crate::report::{AssetRecord, FindingsAggregator, Report};

use super::extract::{ExtractionError, Extractor};
use super::write_json;

/// Unit-level failure. Per-file problems never surface here; they end up in
/// the report's `skipped` list.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("unit not found: {0}")]
    MissingUnit(PathBuf),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Why one binary asset could not be inspected. Recorded in `skipped`.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScanError::Io { path: path.into(), source }
    }

    /// Stable label recorded next to the message in batch results.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::MissingUnit(_) | ScanError::Io { .. } => "io",
            ScanError::Extraction(_) => "extraction",
            ScanError::Serialize { .. } => "serialize",
        }
    }
}

/// Scans one unit at a time: extract, walk, match, persist.
///
/// Holds no per-unit state; every call builds its own aggregator.
pub struct UnitScanner<'a> {
    pub config: &'a ScanConfig,
    pub extractor: &'a dyn Extractor,
    patterns: PatternExtractor,
    layout: OutputLayout,
}

impl<'a> UnitScanner<'a> {
    pub fn new(config: &'a ScanConfig, extractor: &'a dyn Extractor) -> Result<Self, ConfigError> {
        let patterns = PatternExtractor::new(config.compile_rules()?);
        Ok(Self { config, extractor, patterns, layout: config.layout() })
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Scan a unit and persist its report.
    ///
    /// A directory is scanned in place as an already unpacked tree; a file is
    /// extracted into `<output_dir>/<stem>_extracted` first. Anything left in
    /// that directory by an earlier extraction is removed beforehand.
    pub fn scan_unit(&self, unit: &Path) -> Result<Report, ScanError> {
        let name = unit_name(unit);
        if !unit.exists() {
            return Err(ScanError::MissingUnit(unit.to_path_buf()));
        }
        tracing::info!(unit = %name, extractor = self.extractor.name(), "scanning unit");

        let tree = if unit.is_dir() {
            unit.to_path_buf()
        } else {
            let dest = self.layout.extracted_dir(&name);
            clear_dir(&dest)?;
            let summary = self.extractor.extract(unit, &dest)?;
            for entry in &summary.skipped {
                tracing::warn!(unit = %name, entry = %entry, "archive entry not extracted");
            }
            dest
        };

        let report = self.scan_tree(&name, &tree)?;
        let path = self.layout.report_path(&name);
        write_json(&path, &report)?;
        tracing::info!(
            unit = %name,
            findings = report.summary.total(),
            report = %path.display(),
            "unit scanned"
        );
        Ok(report)
    }

    /// Walk an unpacked tree and build its report. Nothing is written.
    pub fn scan_tree(&self, unit: &str, root: &Path) -> Result<Report, ScanError> {
        let mut aggregator = FindingsAggregator::new(unit);
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    let source =
                        err.into_io_error().unwrap_or_else(|| io::Error::other("walk failed"));
                    return Err(ScanError::io(root, source));
                }
                Err(err) => {
                    let label = err.path().map(|p| file_label(root, p)).unwrap_or_default();
                    tracing::warn!(file = %label, error = %err, "unreadable entry");
                    aggregator.push_skipped(label, err);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                self.scan_file(root, entry.path(), &mut aggregator);
            }
        }
        Ok(aggregator.finish())
    }

    fn scan_file(&self, root: &Path, path: &Path, aggregator: &mut FindingsAggregator) {
        let label = file_label(root, path);
        tracing::debug!(file = %label, "scanning file");

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            aggregator.extend(self.patterns.scan_file_name(&label, name));
        }

        if self.config.text_extensions.is_text(path) {
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) => return aggregator.push_skipped(label, err),
            };
            match decode_text(&bytes, self.config.decoding) {
                Ok(text) => aggregator.extend(self.patterns.scan_text(&label, &text)),
                Err(err) => {
                    tracing::debug!(file = %label, error = %err, "skipping undecodable text");
                    aggregator.push_skipped(label, err);
                }
            }
        } else if let Err(err) = self.scan_binary(path, &label, aggregator) {
            aggregator.push_skipped(label, err);
        }
    }

    fn scan_binary(
        &self,
        path: &Path,
        label: &str,
        aggregator: &mut FindingsAggregator,
    ) -> Result<(), AssetError> {
        let mut header = Vec::with_capacity(SIGNATURE_WINDOW);
        File::open(path)?.take(SIGNATURE_WINDOW as u64).read_to_end(&mut header)?;

        let png_named = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if header.starts_with(&PNG_SIGNATURE) || png_named {
            let data = fs::read(path)?;
            let inspection = inspect_image(
                label,
                &data,
                self.config.size_ratio_threshold,
                &self.config.image_markers,
            )?;
            if inspection.is_suspicious() {
                tracing::debug!(
                    file = %label,
                    anomalies = inspection.anomalies.len(),
                    "suspicious image"
                );
                aggregator.push_asset(AssetRecord::Image(inspection));
            }
        } else if self.config.is_firmware_extension(path) {
            let size = fs::metadata(path)?.len();
            aggregator.push_asset(AssetRecord::Blob {
                file: label.to_string(),
                size,
                format: classify(&header),
            });
        }
        Ok(())
    }
}

fn clear_dir(dir: &Path) -> Result<(), ScanError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ScanError::io(dir, err)),
    }
}

/// Display name of a unit: its file name, or the whole path when there is none.
pub fn unit_name(unit: &Path) -> String {
    unit.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| unit.display().to_string())
}

/// Path of `path` relative to the scanned tree, `/`-separated.
fn file_label(root: &Path, path: &Path) -> String {
    let Ok(relative) = path.strip_prefix(root) else {
        return path.display().to_string();
    };
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
