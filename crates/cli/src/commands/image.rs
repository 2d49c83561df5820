use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sieve_core::binary::{inspect_image, AnomalyKind, ImageInspection};

use crate::{load_scan_config, print_json};

/// Inspect one PNG, or every `.png` directly inside a directory.
pub fn inspect_image_command(path: &str, config: Option<&str>, json: bool) -> Result<()> {
    let scan_config = load_scan_config(config, None)?;
    let target = Path::new(path);

    let files = if target.is_dir() { collect_pngs(target)? } else { vec![target.to_path_buf()] };

    let mut inspections = Vec::with_capacity(files.len());
    for file in &files {
        let data =
            fs::read(file).with_context(|| format!("Failed to read image {}", file.display()))?;
        let inspection = inspect_image(
            &file.display().to_string(),
            &data,
            scan_config.size_ratio_threshold,
            &scan_config.image_markers,
        )
        .with_context(|| format!("Failed to inspect {}", file.display()))?;
        inspections.push(inspection);
    }

    if json {
        return if target.is_dir() {
            print_json(&inspections, "inspections")
        } else {
            print_json(&inspections[0], "inspection")
        };
    }

    if inspections.is_empty() {
        println!("No PNG files found in {}", target.display());
    }
    for inspection in &inspections {
        print_inspection(inspection);
    }
    Ok(())
}

fn collect_pngs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if path.is_file() && is_png {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn print_inspection(inspection: &ImageInspection) {
    println!("Image: {} ({} bytes)", inspection.file, inspection.size);

    if let Some(header) = &inspection.header {
        println!(
            "  Dimensions: {}x{}, bit depth {}, color {:?}",
            header.width, header.height, header.bit_depth, header.color_mode
        );
    }
    if let Some(check) = &inspection.size_check {
        let ratio = check.ratio.map(|r| format!("{r:.2}x")).unwrap_or_else(|| "-".to_string());
        let flag = if check.anomalous { " [SUSPICIOUS]" } else { "" };
        println!(
            "  Size: expected ~{} bytes, actual {} bytes, ratio {}{}",
            check.expected_size, check.actual_size, ratio, flag
        );
    }

    println!("  Chunks ({}):", inspection.chunks.len());
    for chunk in &inspection.chunks {
        println!("    - {} @ {} ({} bytes)", chunk.tag, chunk.offset, chunk.length);
    }

    if inspection.anomalies.is_empty() {
        println!("  Anomalies: (none)");
    } else {
        println!("  Anomalies ({}):", inspection.anomalies.len());
        for anomaly in &inspection.anomalies {
            let label = match &anomaly.kind {
                AnomalyKind::UnusualChunk { tag } => format!("unusual chunk {tag}"),
                AnomalyKind::TrailingData => "trailing data".to_string(),
            };
            let severity = if anomaly.critical { "CRITICAL" } else { "info" };
            println!(
                "    - [{severity}] {label} @ {} ({} bytes)",
                anomaly.offset, anomaly.size
            );
            for hint in &anomaly.hints {
                println!("      {}", hint.describe());
            }
        }
    }

    if !inspection.markers.is_empty() {
        println!("  Markers:");
        for hit in &inspection.markers {
            println!("    - {}: {}", hit.marker, hit.count);
        }
    }
}
