use std::fs;
use std::io::Write;
use std::path::Path;

use sieve_core::binary::{FirmwareType, PNG_SIGNATURE};
use sieve_core::config::ScanConfig;
use sieve_core::patterns::Decoding;
use sieve_core::report::{AssetRecord, Report};
use sieve_core::services::{ScanError, UnitScanner, ZipExtractor};
use tempfile::tempdir;
use zip::write::SimpleFileOptions;

fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

fn png_with_trailer(trailer: &[u8]) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend(chunk(b"IHDR", &[0, 0, 0, 16, 0, 0, 0, 16, 8, 6, 0, 0, 0]));
    data.extend(chunk(b"IDAT", &[0; 24]));
    data.extend(chunk(b"IEND", &[]));
    data.extend_from_slice(trailer);
    data
}

const STRINGS_XML: &str = "<string name=\"api\">https://api.example.com/v1/login</string>\n\
                           <string name=\"pw\">password = \"hunter2\"</string>\n";

fn write_apk(path: &Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).expect("create apk");
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, body) in entries {
        zip.start_file(*name, options).expect("start entry");
        zip.write_all(body).expect("write entry");
    }
    zip.finish().expect("finish apk");
}

fn sample_apk(path: &Path) {
    let png = png_with_trailer(b"\x7fELF appended firmware");
    write_apk(
        path,
        &[
            ("res/values/strings.xml", STRINGS_XML.as_bytes()),
            ("assets/config.json", b"{\"debug\": true}"),
            ("res/drawable/logo.png", &png),
            ("assets/ota/ES210.bin", b"\x7fELF\x01\x01\x01\0\0\0\0"),
            ("classes.dex", b"dex\n035\0password = \"ignored\""),
        ],
    );
}

fn config_in(out: &Path) -> ScanConfig {
    ScanConfig { output_dir: out.display().to_string(), ..ScanConfig::default() }
}

/// Scanning an APK extracts it, matches text, reports binary assets and writes the report.
#[test]
fn scan_unit_extracts_matches_and_persists() {
    let dir = tempdir().expect("tempdir");
    let apk = dir.path().join("app.apk");
    sample_apk(&apk);
    let config = config_in(&dir.path().join("out"));
    let extractor = ZipExtractor::default();
    let scanner = UnitScanner::new(&config, &extractor).expect("scanner");

    let report = scanner.scan_unit(&apk).expect("scan");

    assert_eq!(report.apk, "app.apk");
    let creds = &report.findings.passwords;
    assert_eq!(creds.len(), 1);
    assert_eq!(creds[0].file, "res/values/strings.xml");
    assert_eq!(creds[0].value, "hunter2");
    assert_eq!(creds[0].line, 2);
    assert!(report
        .findings
        .urls
        .iter()
        .any(|u| u.url == "https://api.example.com/v1/login" && u.line == 1));
    assert_eq!(report.findings.sensitive_files.len(), 1);
    assert_eq!(report.findings.sensitive_files[0].file, "assets/config.json");
    assert!(report.findings.red_flags.iter().any(|r| r.file == "assets/config.json"));

    assert_eq!(report.assets.len(), 2);
    match &report.assets[0] {
        AssetRecord::Blob { file, size, format } => {
            assert_eq!(file, "assets/ota/ES210.bin");
            assert_eq!(*size, 11);
            assert_eq!(*format, FirmwareType::Executable);
        }
        other => panic!("expected blob, got {other:?}"),
    }
    match &report.assets[1] {
        AssetRecord::Image(image) => {
            assert_eq!(image.file, "res/drawable/logo.png");
            assert!(image.has_trailing_data());
        }
        other => panic!("expected image, got {other:?}"),
    }
    assert!(report.skipped.is_empty());

    let out = dir.path().join("out");
    assert!(out.join("app_extracted").join("classes.dex").is_file());
    let persisted: Report = serde_json::from_str(
        &fs::read_to_string(out.join("app_report.json")).expect("report file"),
    )
    .expect("parse report");
    assert_eq!(persisted, report);
}

/// Scanning the same unit twice gives the same counts.
#[test]
fn rescanning_an_unchanged_unit_gives_the_same_summary() {
    let dir = tempdir().expect("tempdir");
    let apk = dir.path().join("app.apk");
    sample_apk(&apk);
    let config = config_in(&dir.path().join("out"));
    let extractor = ZipExtractor::default();
    let scanner = UnitScanner::new(&config, &extractor).expect("scanner");

    let first = scanner.scan_unit(&apk).expect("first scan");
    let second = scanner.scan_unit(&apk).expect("second scan");
    assert_eq!(first.summary, second.summary);
    assert_eq!(first, second);
}

/// A unit sharing a stem with an earlier one must not inherit its extracted files.
#[test]
fn units_with_the_same_stem_do_not_share_extracted_files() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("one")).expect("mkdir one");
    fs::create_dir_all(dir.path().join("two")).expect("mkdir two");
    let first = dir.path().join("one").join("app.apk");
    let second = dir.path().join("two").join("app.apk");
    write_apk(&first, &[("secret.txt", b"password = \"hunter2\"")]);
    write_apk(&second, &[("clean.txt", b"nothing to see")]);

    let config = config_in(&dir.path().join("out"));
    let extractor = ZipExtractor::default();
    let scanner = UnitScanner::new(&config, &extractor).expect("scanner");

    let report = scanner.scan_unit(&first).expect("first scan");
    assert_eq!(report.summary.passwords_found, 1);

    let report = scanner.scan_unit(&second).expect("second scan");
    assert_eq!(report.summary.passwords_found, 0);
    assert!(report.is_clean());
    let extracted = scanner.layout().extracted_dir("app.apk");
    assert!(!extracted.join("secret.txt").exists());
    assert!(extracted.join("clean.txt").is_file());
}

/// An unpacked directory is scanned where it is.
#[test]
fn directories_are_scanned_in_place() {
    let dir = tempdir().expect("tempdir");
    let tree = dir.path().join("decompiled");
    fs::create_dir_all(tree.join("smali/com/app")).expect("mkdir");
    fs::write(tree.join("smali/com/app/Api.smali"), "const-string v0, \"/api/v2/unlock\"")
        .expect("write smali");
    let config = config_in(&dir.path().join("out"));
    let extractor = ZipExtractor::default();
    let scanner = UnitScanner::new(&config, &extractor).expect("scanner");

    let report = scanner.scan_unit(&tree).expect("scan dir");
    assert_eq!(report.apk, "decompiled");
    assert_eq!(report.findings.backends[0].file, "smali/com/app/Api.smali");
    assert_eq!(report.findings.backends[0].endpoint, "/api/v2/unlock");
    assert!(!dir.path().join("out").join("decompiled_extracted").exists());
    assert!(dir.path().join("out").join("decompiled_report.json").is_file());
}

/// Files that cannot be decoded or parsed are skipped and the scan goes on.
#[test]
fn per_file_failures_are_recorded_and_the_scan_continues() {
    let dir = tempdir().expect("tempdir");
    let tree = dir.path().join("tree");
    fs::create_dir_all(&tree).expect("mkdir");
    fs::write(tree.join("broken.txt"), b"token = 'a\xffb'").expect("write");
    fs::write(tree.join("fake.png"), b"RIFF\0\0\0\0WEBPVP8 ").expect("write");
    fs::write(tree.join("ok.txt"), "secret = \"s\"").expect("write");

    let config = ScanConfig { decoding: Decoding::Strict, ..config_in(&dir.path().join("out")) };
    let extractor = ZipExtractor::default();
    let scanner = UnitScanner::new(&config, &extractor).expect("scanner");

    let report = scanner.scan_tree("tree", &tree).expect("scan tree");
    let skipped: Vec<_> = report.skipped.iter().map(|s| s.file.as_str()).collect();
    assert_eq!(skipped, ["broken.txt", "fake.png"]);
    assert!(report.skipped[0].error.contains("not valid UTF-8"));
    assert!(report.skipped[1].error.contains("not a PNG container"));
    assert_eq!(report.findings.passwords.len(), 1);
    assert_eq!(report.findings.passwords[0].file, "ok.txt");
}

/// With lossy decoding, invalid bytes do not hide the findings around them.
#[test]
fn lossy_decoding_scans_around_invalid_bytes() {
    let dir = tempdir().expect("tempdir");
    let tree = dir.path().join("tree");
    fs::create_dir_all(&tree).expect("mkdir");
    fs::write(tree.join("mixed.txt"), b"\xfe\xfftoken = \"abc\"").expect("write");

    let config = config_in(&dir.path().join("out"));
    let extractor = ZipExtractor::default();
    let scanner = UnitScanner::new(&config, &extractor).expect("scanner");

    let report = scanner.scan_tree("tree", &tree).expect("scan tree");
    assert!(report.skipped.is_empty());
    assert_eq!(report.findings.passwords[0].value, "abc");
}

/// Missing and corrupt units fail with their own error kinds.
#[test]
fn unit_level_failures_are_typed() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(&dir.path().join("out"));
    let extractor = ZipExtractor::default();
    let scanner = UnitScanner::new(&config, &extractor).expect("scanner");

    let missing = scanner.scan_unit(&dir.path().join("gone.apk")).expect_err("missing unit");
    assert!(matches!(missing, ScanError::MissingUnit(_)));
    assert_eq!(missing.kind(), "io");

    let corrupt = dir.path().join("corrupt.apk");
    fs::write(&corrupt, b"this is not a zip archive").expect("write");
    let err = scanner.scan_unit(&corrupt).expect_err("corrupt unit");
    assert!(matches!(err, ScanError::Extraction(_)));
    assert_eq!(err.kind(), "extraction");
    assert!(!dir.path().join("out").join("corrupt_report.json").exists());
}

/// An empty tree produces a clean report.
#[test]
fn empty_tree_is_a_valid_clean_report() {
    let dir = tempdir().expect("tempdir");
    let tree = dir.path().join("empty");
    fs::create_dir_all(&tree).expect("mkdir");
    let config = config_in(&dir.path().join("out"));
    let extractor = ZipExtractor::default();
    let scanner = UnitScanner::new(&config, &extractor).expect("scanner");

    let report = scanner.scan_tree("empty", &tree).expect("scan");
    assert!(report.is_clean());
}
