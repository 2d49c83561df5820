use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    "xml", "json", "js", "java", "smali", "txt", "html", "htm", "css", "properties", "yml",
    "yaml", "conf", "config", "sh", "bat", "md", "kt",
];

/// Extension → "scan as text" table. The empty key stands for extensionless files.
///
/// Extensions are stored and looked up lowercase; anything absent is binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextExtensions(BTreeMap<String, bool>);

impl Default for TextExtensions {
    fn default() -> Self {
        let mut table: BTreeMap<String, bool> =
            DEFAULT_TEXT_EXTENSIONS.iter().map(|ext| (ext.to_string(), true)).collect();
        table.insert(String::new(), true);
        Self(table)
    }
}

impl TextExtensions {
    pub fn new(table: BTreeMap<String, bool>) -> Self {
        Self(table.into_iter().map(|(ext, text)| (normalize(&ext), text)).collect())
    }

    pub fn set(&mut self, extension: &str, is_text: bool) {
        self.0.insert(normalize(extension), is_text);
    }

    pub fn is_text(&self, path: &Path) -> bool {
        let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase()).unwrap_or_default();
        self.0.get(&ext).copied().unwrap_or(false)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(ext, text)| (ext.as_str(), *text))
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

/// How to treat file content that is not valid UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decoding {
    /// Drop invalid sequences and scan the rest.
    #[default]
    Lossy,
    /// Refuse the file with a [`DecodeError`].
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("content is not valid UTF-8 (invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },
}

pub fn decode_text(bytes: &[u8], decoding: Decoding) -> Result<String, DecodeError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(err) => match decoding {
            Decoding::Strict => Err(DecodeError::InvalidUtf8 { offset: err.valid_up_to() }),
            Decoding::Lossy => Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensionless_and_listed_files_are_text() {
        let table = TextExtensions::default();
        assert!(table.is_text(Path::new("res/values/strings.XML")));
        assert!(table.is_text(Path::new("META-INF/CERT")));
        assert!(table.is_text(Path::new(".env")));
        assert!(!table.is_text(Path::new("classes.dex")));
        assert!(!table.is_text(Path::new("res/drawable/logo.png")));
    }

    #[test]
    fn table_entries_can_be_overridden() {
        let mut table = TextExtensions::default();
        table.set(".dex", true);
        table.set("", false);
        assert!(table.is_text(Path::new("classes.dex")));
        assert!(!table.is_text(Path::new("LICENSE")));
    }

    #[test]
    fn lossy_decoding_drops_invalid_sequences() {
        assert_eq!(decode_text(b"ab\xffcd", Decoding::Lossy).unwrap(), "abcd");
        assert_eq!(
            decode_text(b"ab\xffcd", Decoding::Strict).unwrap_err(),
            DecodeError::InvalidUtf8 { offset: 2 }
        );
    }
}
