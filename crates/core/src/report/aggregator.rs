use crate::patterns::{Category, Finding};

use super::{
    AssetRecord, BackendRecord, CategorizedFindings, CredentialRecord, RedFlagRecord, Report,
    ReportSummary, SensitiveFileRecord, SkippedFile, UrlRecord,
};

/// Collects everything produced while walking one unit's tree.
///
/// Build one per unit; `finish` consumes it, so nothing carries over.
#[derive(Debug, Default)]
pub struct FindingsAggregator {
    unit: String,
    findings: CategorizedFindings,
    assets: Vec<AssetRecord>,
    skipped: Vec<SkippedFile>,
}

impl FindingsAggregator {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into(), ..Default::default() }
    }

    pub fn push(&mut self, finding: Finding) {
        let line = finding.line.unwrap_or_default();
        match finding.category {
            Category::Credentials => self.findings.passwords.push(CredentialRecord {
                file: finding.file,
                matched: finding.matched,
                value: finding.value,
                line,
            }),
            Category::Urls => self.findings.urls.push(UrlRecord {
                file: finding.file,
                url: finding.matched,
                line,
            }),
            Category::Backends => self.findings.backends.push(BackendRecord {
                file: finding.file,
                endpoint: finding.matched,
                line,
            }),
            Category::SensitiveFiles => self.findings.sensitive_files.push(SensitiveFileRecord {
                file: finding.file,
                reason: format!("Matches pattern: {}", finding.pattern),
            }),
            Category::RedFlags => self.findings.red_flags.push(RedFlagRecord {
                file: finding.file,
                issue: finding.matched,
                pattern: finding.pattern,
                line,
            }),
        }
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    pub fn push_asset(&mut self, asset: AssetRecord) {
        self.assets.push(asset);
    }

    pub fn push_skipped(&mut self, file: impl Into<String>, error: impl ToString) {
        self.skipped.push(SkippedFile { file: file.into(), error: error.to_string() });
    }

    pub fn count(&self, category: Category) -> usize {
        self.findings.count(category)
    }

    pub fn finish(self) -> Report {
        Report {
            apk: self.unit,
            summary: ReportSummary::from_findings(&self.findings),
            findings: self.findings,
            assets: self.assets,
            skipped: self.skipped,
        }
    }
}
