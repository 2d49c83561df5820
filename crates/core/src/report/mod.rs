//! Per-unit report model and the aggregator that builds it.
//!
//! The JSON shape of [`Report`] is the persisted per-APK document; record field
//! names (`match`, `url`, `endpoint`, `issue`, ...) are part of that format.

mod aggregator;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::binary::{FirmwareType, ImageInspection};
use crate::patterns::Category;

pub use aggregator::FindingsAggregator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub file: String,
    #[serde(rename = "match")]
    pub matched: String,
    pub value: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub file: String,
    pub url: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRecord {
    pub file: String,
    pub endpoint: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveFileRecord {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedFlagRecord {
    pub file: String,
    pub issue: String,
    pub pattern: String,
    pub line: usize,
}

/// Findings grouped by category, each list in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedFindings {
    #[serde(default)]
    pub passwords: Vec<CredentialRecord>,
    #[serde(default)]
    pub urls: Vec<UrlRecord>,
    #[serde(default)]
    pub backends: Vec<BackendRecord>,
    #[serde(default)]
    pub sensitive_files: Vec<SensitiveFileRecord>,
    #[serde(default)]
    pub red_flags: Vec<RedFlagRecord>,
}

impl CategorizedFindings {
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Credentials => self.passwords.len(),
            Category::Urls => self.urls.len(),
            Category::Backends => self.backends.len(),
            Category::SensitiveFiles => self.sensitive_files.len(),
            Category::RedFlags => self.red_flags.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub passwords_found: usize,
    pub urls_found: usize,
    pub backends_found: usize,
    pub sensitive_files_found: usize,
    pub red_flags_found: usize,
}

impl ReportSummary {
    pub fn from_findings(findings: &CategorizedFindings) -> Self {
        Self {
            passwords_found: findings.count(Category::Credentials),
            urls_found: findings.count(Category::Urls),
            backends_found: findings.count(Category::Backends),
            sensitive_files_found: findings.count(Category::SensitiveFiles),
            red_flags_found: findings.count(Category::RedFlags),
        }
    }

    pub fn total(&self) -> usize {
        self.passwords_found
            + self.urls_found
            + self.backends_found
            + self.sensitive_files_found
            + self.red_flags_found
    }
}

/// A binary asset worth reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "asset", rename_all = "snake_case")]
pub enum AssetRecord {
    /// PNG with anomalies, an oversized body, or firmware markers.
    Image(ImageInspection),
    /// Blob whose extension marks it as a likely firmware image.
    Blob { file: String, size: u64, format: FirmwareType },
}

impl AssetRecord {
    pub fn file(&self) -> &str {
        match self {
            AssetRecord::Image(image) => &image.file,
            AssetRecord::Blob { file, .. } => file,
        }
    }
}

/// A file that could not be analysed; the rest of the unit was still scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub file: String,
    pub error: String,
}

/// Result of scanning one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub apk: String,
    pub summary: ReportSummary,
    pub findings: CategorizedFindings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

impl Report {
    /// Distinct URL strings in first-seen order. Display only; `findings` is untouched.
    pub fn unique_urls(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.findings
            .urls
            .iter()
            .map(|record| record.url.as_str())
            .filter(|url| seen.insert(*url))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.summary.total() == 0 && self.assets.is_empty()
    }
}
