use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::DEFAULT_MAX_ENTRY_BYTES;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt archive {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What an extraction produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Files written.
    pub files: usize,
    /// Entries left out (unsafe names, oversized), with the reason.
    pub skipped: Vec<String>,
}

/// Unpacks a container into a directory.
pub trait Extractor: Send + Sync {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<ExtractionSummary, ExtractionError>;
    fn name(&self) -> &'static str;
}

/// Zip-family extractor (APK, JAR, ZIP).
///
/// Entries whose names would escape `dest` are skipped, and each entry is
/// capped at `max_entry_bytes`.
#[derive(Debug, Clone, Copy)]
pub struct ZipExtractor {
    pub max_entry_bytes: u64,
}

impl Default for ZipExtractor {
    fn default() -> Self {
        Self { max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES }
    }
}

impl ZipExtractor {
    pub fn new(max_entry_bytes: u64) -> Self {
        Self { max_entry_bytes }
    }
}

impl Extractor for ZipExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<ExtractionSummary, ExtractionError> {
        let corrupt = |message: String| ExtractionError::Corrupt {
            path: archive.to_path_buf(),
            message,
        };
        let write_err = |path: &Path, source: io::Error| ExtractionError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(archive)
            .map_err(|source| ExtractionError::Open { path: archive.to_path_buf(), source })?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| corrupt(e.to_string()))?;
        fs::create_dir_all(dest).map_err(|e| write_err(dest, e))?;

        let mut summary = ExtractionSummary::default();
        for i in 0..zip.len() {
            let entry = zip.by_index(i).map_err(|e| corrupt(e.to_string()))?;
            let name = entry.name().to_string();

            let Some(relative) = entry.enclosed_name() else {
                tracing::warn!(
                    archive = %archive.display(),
                    entry = %name,
                    "skipping unsafe entry name"
                );
                summary.skipped.push(format!("{name}: unsafe path"));
                continue;
            };
            let out_path = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path).map_err(|e| write_err(&out_path, e))?;
                continue;
            }
            if entry.size() > self.max_entry_bytes {
                tracing::warn!(entry = %name, size = entry.size(), "skipping oversized entry");
                summary.skipped.push(format!("{name}: {} bytes exceeds limit", entry.size()));
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
            }
            let mut out = File::create(&out_path).map_err(|e| write_err(&out_path, e))?;
            io::copy(&mut entry.take(self.max_entry_bytes), &mut out)
                .map_err(|e| corrupt(format!("{name}: {e}")))?;
            summary.files += 1;
        }

        tracing::debug!(
            archive = %archive.display(),
            files = summary.files,
            skipped = summary.skipped.len(),
            "archive extracted"
        );
        Ok(summary)
    }

    fn name(&self) -> &'static str {
        "zip"
    }
}
