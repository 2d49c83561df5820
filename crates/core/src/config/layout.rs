use std::path::{Path, PathBuf};

/// File stem of a unit name or path (`app.apk` → `app`).
///
/// Falls back to the full name when there is no stem.
pub fn unit_stem(name: impl AsRef<Path>) -> String {
    let name = name.as_ref();
    name.file_stem()
        .or_else(|| name.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}

/// Logical layout of the output directory.
///
/// Computes paths only; callers create directories as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Root of all scan output.
    pub root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Working directory a unit is unpacked into.
    pub fn extracted_dir(&self, unit: &str) -> PathBuf {
        self.root.join(format!("{}_extracted", unit_stem(unit)))
    }

    /// Persisted per-unit report.
    pub fn report_path(&self, unit: &str) -> PathBuf {
        self.root.join(format!("{}_report.json", unit_stem(unit)))
    }

    /// Unpack target for archive-family firmware blobs.
    pub fn firmware_dir(&self, unit: &str) -> PathBuf {
        self.root.join(format!("{}_zip", unit_stem(unit)))
    }
}
