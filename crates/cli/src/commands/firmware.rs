use std::path::Path;

use anyhow::{Context, Result};
use sieve_core::config::OutputLayout;
use sieve_core::firmware::{analyze_firmware, FirmwareAnalysis, FirmwareOptions};
use sieve_core::services::ZipExtractor;

use crate::print_json;

const SAMPLE_STRINGS: usize = 10;

/// Identify, hash and string-mine one firmware blob.
pub fn firmware_command(
    file: &str,
    min_len: usize,
    extract: bool,
    output_dir: &str,
    json: bool,
) -> Result<()> {
    let path = Path::new(file);
    let extract_to = extract.then(|| OutputLayout::new(output_dir).firmware_dir(file));
    let options = FirmwareOptions { min_len, extract_to };

    let analysis = analyze_firmware(path, &options, &ZipExtractor::default())
        .with_context(|| format!("Failed to analyze firmware {}", path.display()))?;

    if json {
        return print_json(&analysis, "firmware analysis");
    }
    print_analysis(&analysis);
    Ok(())
}

fn print_analysis(analysis: &FirmwareAnalysis) {
    println!("Firmware: {}", analysis.file);
    println!("  Size: {} bytes", analysis.size);
    println!("  SHA-256: {}", analysis.sha256);
    println!("  Type: {}", analysis.file_type);
    if let Some(extraction) = &analysis.extraction {
        println!("  Extracted {} files to {}", extraction.files, extraction.directory);
    }
    println!("  Printable strings: {}", analysis.strings_found);

    let interesting = &analysis.interesting;
    for (label, bucket) in [
        ("URLs", &interesting.urls),
        ("IP addresses", &interesting.ips),
        ("Emails", &interesting.emails),
        ("Possible keys", &interesting.keys),
        ("Paths", &interesting.paths),
    ] {
        if bucket.is_empty() {
            continue;
        }
        println!("  {label} ({}):", bucket.len());
        for item in bucket.iter().take(SAMPLE_STRINGS) {
            println!("    - {item}");
        }
    }
}
