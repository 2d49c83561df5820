use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FIELD_KEYWORDS: &[&str] = &["firmware", "download", "url", "version", "partition"];

static DOWNLOAD_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+\.bin"#).expect("download url regex"));

/// Callbacks for [`walk`]. Paths are rendered `a.b[2].c`.
pub trait JsonVisitor {
    /// Every object member, before its value is descended into.
    fn visit_field(&mut self, _path: &str, _key: &str, _value: &Value) {}
}

/// Depth-first walk over `value`, calling `visitor` for each object member.
pub fn walk(value: &Value, visitor: &mut dyn JsonVisitor) {
    walk_at(value, "", visitor);
}

fn walk_at(value: &Value, path: &str, visitor: &mut dyn JsonVisitor) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path =
                    if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                visitor.visit_field(&child_path, key, child);
                walk_at(child, &child_path, visitor);
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                walk_at(item, &format!("{path}[{idx}]"), visitor);
            }
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedField {
    pub path: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorResult {
    pub format: BodyFormat,
    /// Body mentions "firmware" at all (case-insensitive).
    pub mentions_firmware: bool,
    /// Members whose key looks firmware-related.
    pub fields: Vec<LocatedField>,
    pub download_urls: Vec<String>,
}

/// Collects firmware-looking fields and `.bin` download URLs.
#[derive(Debug, Default)]
pub struct FirmwareLocator {
    pub fields: Vec<LocatedField>,
    pub download_urls: Vec<String>,
}

impl FirmwareLocator {
    pub fn key_matches(key: &str) -> bool {
        let key = key.to_lowercase();
        FIELD_KEYWORDS.iter().any(|kw| key.contains(kw))
    }

    pub fn is_download_url(value: &str) -> bool {
        value.starts_with("http") && value.contains(".bin")
    }
}

impl JsonVisitor for FirmwareLocator {
    fn visit_field(&mut self, path: &str, key: &str, value: &Value) {
        if Self::key_matches(key) {
            self.fields.push(LocatedField { path: path.to_string(), value: value.clone() });
        }
        if let Value::String(s) = value {
            if Self::is_download_url(s) {
                tracing::debug!(path, url = %s, "firmware download URL");
                self.download_urls.push(s.clone());
            }
        }
    }
}

/// Search a captured response body. Falls back to a regex scan when the body
/// is not JSON.
pub fn locate_in_text(body: &str) -> LocatorResult {
    let mentions_firmware = body.to_lowercase().contains("firmware");
    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            let mut locator = FirmwareLocator::default();
            walk(&value, &mut locator);
            LocatorResult {
                format: BodyFormat::Json,
                mentions_firmware,
                fields: locator.fields,
                download_urls: locator.download_urls,
            }
        }
        Err(err) => {
            tracing::debug!(error = %err, "body is not JSON, scanning raw text");
            LocatorResult {
                format: BodyFormat::Text,
                mentions_firmware,
                fields: Vec::new(),
                download_urls: DOWNLOAD_URL_RE
                    .find_iter(body)
                    .map(|m| m.as_str().to_string())
                    .collect(),
            }
        }
    }
}
