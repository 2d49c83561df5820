use std::path::Path;

use anyhow::{anyhow, Context, Result};
use sieve_core::services::{BatchOrchestrator, BatchResult, UnitScanner, UnitStatus, ZipExtractor};

use crate::load_scan_config;

/// Scan every unit in `dir` and write the combined batch document to `output`.
pub fn batch_command(
    dir: &str,
    output: &str,
    output_dir: Option<&str>,
    config: Option<&str>,
) -> Result<()> {
    let dir_path = Path::new(dir);
    if !dir_path.is_dir() {
        return Err(anyhow!("Directory {} not found", dir_path.display()));
    }

    let scan_config = load_scan_config(config, output_dir)?;
    let extractor = ZipExtractor::new(scan_config.max_entry_bytes);
    let scanner = UnitScanner::new(&scan_config, &extractor).context("Failed to compile rules")?;
    let orchestrator = BatchOrchestrator::new(scanner);

    let units = orchestrator
        .collect_units(dir_path)
        .with_context(|| format!("Failed to list units in {}", dir_path.display()))?;
    if units.is_empty() {
        println!("No .{} files found in {}", scan_config.unit_extension, dir_path.display());
        return Ok(());
    }
    println!("Found {} units to scan", units.len());

    let result = orchestrator.run_units(dir, &units);
    let output_path = Path::new(output);
    result
        .write_json(output_path)
        .with_context(|| format!("Failed to write batch report {}", output_path.display()))?;

    print_batch_summary(&result);
    println!("Report saved to: {}", output_path.display());
    Ok(())
}

pub fn print_batch_summary(result: &BatchResult) {
    let summary = &result.summary;
    println!("Batch summary");
    println!("=============");
    println!("Total scanned: {}", result.total_apks);
    println!("Successful: {}", summary.successful_scans);
    println!("Failed: {}", summary.failed_scans);
    for outcome in &result.scans {
        if let UnitStatus::Failed { error, .. } = &outcome.status {
            println!("  - {}: {}", outcome.apk, error);
        }
    }
    println!("Total passwords found: {}", summary.total_passwords);
    println!("Total URLs found: {}", summary.total_urls);
    println!("Total backends found: {}", summary.total_backends);
}
