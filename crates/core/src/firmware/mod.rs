//! Standalone analysis of firmware blobs and captured update responses.
//!
//! Nothing here touches the network. `analyze_firmware` works on a file that
//! is already on disk; [`locator`] searches a captured response body for
//! download URLs.

pub mod locator;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::binary::{
    classify, extract_printable, FirmwareType, InterestingStrings, DEFAULT_MIN_STRING_LEN,
};
use crate::services::{ExtractionError, Extractor};

pub use locator::{
    locate_in_text, walk, BodyFormat, FirmwareLocator, JsonVisitor, LocatedField, LocatorResult,
};

#[derive(Debug, Error)]
pub enum FirmwareError {
    #[error("failed to read firmware {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareOptions {
    /// Shortest printable run kept as a string.
    pub min_len: usize,
    /// Unpack archive-family blobs here.
    pub extract_to: Option<PathBuf>,
}

impl Default for FirmwareOptions {
    fn default() -> Self {
        Self { min_len: DEFAULT_MIN_STRING_LEN, extract_to: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareExtraction {
    pub directory: String,
    pub files: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareAnalysis {
    pub file: String,
    pub size: u64,
    pub sha256: String,
    pub file_type: FirmwareType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<FirmwareExtraction>,
    pub strings_found: usize,
    pub interesting: InterestingStrings,
}

pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Identify, digest and string-mine one blob.
///
/// Archive-family blobs are unpacked with `extractor` when
/// `options.extract_to` is set; other types ignore it.
pub fn analyze_firmware(
    path: &Path,
    options: &FirmwareOptions,
    extractor: &dyn Extractor,
) -> Result<FirmwareAnalysis, FirmwareError> {
    let data = fs::read(path)
        .map_err(|source| FirmwareError::Read { path: path.to_path_buf(), source })?;
    let file_type = classify(&data);
    tracing::info!(file = %path.display(), size = data.len(), %file_type, "analyzing firmware");

    let extraction = match &options.extract_to {
        Some(dest) if file_type.is_archive() => {
            let summary = extractor.extract(path, dest)?;
            Some(FirmwareExtraction {
                directory: dest.display().to_string(),
                files: summary.files,
                skipped: summary.skipped,
            })
        }
        _ => None,
    };

    let strings = extract_printable(&data, options.min_len);
    tracing::debug!(count = strings.len(), "printable strings extracted");

    Ok(FirmwareAnalysis {
        file: path.display().to_string(),
        size: data.len() as u64,
        sha256: sha256_hex(&data),
        file_type,
        extraction,
        strings_found: strings.len(),
        interesting: InterestingStrings::classify(&strings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
