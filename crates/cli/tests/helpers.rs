use std::fs;

use apk_sieve::{load_scan_config, write_report_summary};
use sieve_core::patterns::{Category, Finding};
use sieve_core::report::FindingsAggregator;
use tempfile::tempdir;

fn url(i: usize) -> Finding {
    Finding {
        category: Category::Urls,
        file: "a.js".into(),
        line: Some(i),
        matched: format!("https://host{}.example.com", i % 12),
        value: String::new(),
        pattern: "p".into(),
    }
}

/// --output-dir overrides the config file's output directory.
#[test]
fn output_dir_override_wins_over_config() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sieve.json");
    fs::write(&path, r#"{"output_dir": "from-config", "unit_extension": "zip"}"#)
        .expect("write config");
    let path_str = path.to_string_lossy().into_owned();

    let config = load_scan_config(Some(&path_str), None).expect("load");
    assert_eq!(config.output_dir, "from-config");
    assert_eq!(config.unit_extension, "zip");

    let config = load_scan_config(Some(&path_str), Some("elsewhere")).expect("load");
    assert_eq!(config.output_dir, "elsewhere");
}

/// A config path that does not exist is an error, not defaults.
#[test]
fn missing_config_file_is_an_error() {
    let err = load_scan_config(Some("/definitely/not/here.yaml"), None).expect_err("missing");
    assert!(format!("{err:#}").contains("failed to read config"));
}

/// The console summary samples at most ten unique URLs.
#[test]
fn summary_samples_ten_unique_urls() {
    let mut aggregator = FindingsAggregator::new("app.apk");
    aggregator.extend((0..30).map(url));
    let report = aggregator.finish();

    let mut out = Vec::new();
    write_report_summary(&mut out, &report).expect("write summary");
    let text = String::from_utf8(out).expect("utf8");

    assert!(text.contains("URLs: 30"));
    assert!(text.contains("Sample URLs (12 unique):"));
    assert_eq!(text.matches("  - https://").count(), 10);
    assert!(!text.contains("Nothing found."));
}

/// A clean report prints "Nothing found."
#[test]
fn clean_report_says_so() {
    let report = FindingsAggregator::new("clean.apk").finish();
    let mut out = Vec::new();
    write_report_summary(&mut out, &report).expect("write summary");
    assert!(String::from_utf8(out).expect("utf8").contains("Nothing found."));
}
