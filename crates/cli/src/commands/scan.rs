use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use sieve_core::report::{AssetRecord, Report};
use sieve_core::services::{UnitScanner, ZipExtractor};

use crate::{load_scan_config, print_json};

const SAMPLE_PASSWORDS: usize = 5;
const SAMPLE_URLS: usize = 10;
const SAMPLE_BACKENDS: usize = 5;
const SAMPLE_RED_FLAGS: usize = 10;

/// Scan a single unit and print its summary (or the full report with `--json`).
pub fn scan_command(
    apk: &str,
    output_dir: Option<&str>,
    config: Option<&str>,
    json: bool,
) -> Result<()> {
    let scan_config = load_scan_config(config, output_dir)?;
    let extractor = ZipExtractor::new(scan_config.max_entry_bytes);
    let scanner = UnitScanner::new(&scan_config, &extractor).context("Failed to compile rules")?;

    let report =
        scanner.scan_unit(Path::new(apk)).with_context(|| format!("Failed to scan {apk}"))?;

    if json {
        return print_json(&report, "report");
    }

    let mut stdout = io::stdout().lock();
    write_report_summary(&mut stdout, &report).context("Failed to write summary")?;
    writeln!(stdout, "Report saved to: {}", scanner.layout().report_path(&report.apk).display())?;
    Ok(())
}

/// Human-readable summary: counts, then a few samples per category.
pub fn write_report_summary(out: &mut impl Write, report: &Report) -> io::Result<()> {
    let summary = &report.summary;
    writeln!(out, "Scan results: {}", report.apk)?;
    writeln!(out, "==========================")?;
    writeln!(out, "Passwords/credentials: {}", summary.passwords_found)?;
    writeln!(out, "URLs: {}", summary.urls_found)?;
    writeln!(out, "Backend endpoints: {}", summary.backends_found)?;
    writeln!(out, "Sensitive files: {}", summary.sensitive_files_found)?;
    writeln!(out, "Red flags: {}", summary.red_flags_found)?;

    let findings = &report.findings;
    if !findings.passwords.is_empty() {
        writeln!(out, "\nSample credentials:")?;
        for item in findings.passwords.iter().take(SAMPLE_PASSWORDS) {
            writeln!(out, "  - {}:{} -> {}", item.file, item.line, item.matched)?;
        }
    }

    let urls = report.unique_urls();
    if !urls.is_empty() {
        writeln!(out, "\nSample URLs ({} unique):", urls.len())?;
        for url in urls.iter().take(SAMPLE_URLS) {
            writeln!(out, "  - {url}")?;
        }
    }

    if !findings.backends.is_empty() {
        writeln!(out, "\nSample backend endpoints:")?;
        for item in findings.backends.iter().take(SAMPLE_BACKENDS) {
            writeln!(out, "  - {}", item.endpoint)?;
        }
    }

    if !findings.red_flags.is_empty() {
        writeln!(out, "\nRed flags:")?;
        for item in findings.red_flags.iter().take(SAMPLE_RED_FLAGS) {
            writeln!(out, "  - {}:{} -> {}", item.file, item.line, item.issue)?;
        }
    }

    if !report.assets.is_empty() {
        writeln!(out, "\nSuspicious assets:")?;
        for asset in &report.assets {
            match asset {
                AssetRecord::Image(image) => writeln!(
                    out,
                    "  - {} (image, {} anomalies, {} marker hits)",
                    image.file,
                    image.anomalies.len(),
                    image.markers.len()
                )?,
                AssetRecord::Blob { file, size, format } => {
                    writeln!(out, "  - {file} ({format}, {size} bytes)")?
                }
            }
        }
    }

    if !report.skipped.is_empty() {
        writeln!(out, "\nSkipped files: {}", report.skipped.len())?;
        for item in &report.skipped {
            writeln!(out, "  - {}: {}", item.file, item.error)?;
        }
    }

    if report.is_clean() {
        writeln!(out, "\nNothing found.")?;
    }
    Ok(())
}
