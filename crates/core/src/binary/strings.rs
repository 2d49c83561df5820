//! Printable string extraction and triage for opaque blobs.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Default minimum run length for [`extract_printable`].
pub const DEFAULT_MIN_STRING_LEN: usize = 6;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"https?://\S+").case_insensitive(true).build().expect("url regex")
});
static IP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("ip regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email regex")
});
static KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"(?:api[_-]?key|password|secret|token)[\s:=]+[a-zA-Z0-9]+")
        .case_insensitive(true)
        .build()
        .expect("key regex")
});

/// Collect runs of printable ASCII (0x20..=0x7e) at least `min_len` long.
pub fn extract_printable(data: &[u8], min_len: usize) -> Vec<String> {
    let min_len = min_len.max(1);
    let mut strings = Vec::new();
    let mut start = None;

    for (i, byte) in data.iter().enumerate() {
        let printable = (0x20..=0x7e).contains(byte);
        match (printable, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    strings.push(String::from_utf8_lossy(&data[s..i]).into_owned());
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if data.len() - s >= min_len {
            strings.push(String::from_utf8_lossy(&data[s..]).into_owned());
        }
    }
    strings
}

/// Strings bucketed by what they look like. A string can land in several buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestingStrings {
    pub urls: Vec<String>,
    pub ips: Vec<String>,
    pub emails: Vec<String>,
    pub keys: Vec<String>,
    pub paths: Vec<String>,
}

impl InterestingStrings {
    pub fn classify<S: AsRef<str>>(strings: &[S]) -> Self {
        let mut out = Self::default();
        for s in strings {
            let s = s.as_ref();
            if URL_RE.is_match(s) {
                out.urls.push(s.to_string());
            }
            if IP_RE.is_match(s) {
                out.ips.push(s.to_string());
            }
            if EMAIL_RE.is_match(s) {
                out.emails.push(s.to_string());
            }
            if KEY_RE.is_match(s) {
                out.keys.push(s.to_string());
            }
            if s.contains('/') && s.len() > 10 {
                out.paths.push(s.to_string());
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
            && self.ips.is_empty()
            && self.emails.is_empty()
            && self.keys.is_empty()
            && self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_runs_and_keeps_the_tail() {
        let data = b"\x00\x01hello world\xffab\x00tail-run";
        assert_eq!(extract_printable(data, 6), vec!["hello world", "tail-run"]);
    }

    #[test]
    fn classifies_into_multiple_buckets() {
        let found = InterestingStrings::classify(&[
            "https://10.0.0.1/fw.bin",
            "ops@example.com",
            "API_KEY=abc123",
            "plain",
        ]);
        assert_eq!(found.urls, vec!["https://10.0.0.1/fw.bin"]);
        assert_eq!(found.ips, vec!["https://10.0.0.1/fw.bin"]);
        assert_eq!(found.paths, vec!["https://10.0.0.1/fw.bin"]);
        assert_eq!(found.emails, vec!["ops@example.com"]);
        assert_eq!(found.keys, vec!["API_KEY=abc123"]);
    }
}
