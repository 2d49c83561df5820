//! Categorized regex extraction over decoded text.
//!
//! Rule tables live in [`rules`], text eligibility and decoding in [`text`],
//! and the matching itself in [`extractor`].

pub mod extractor;
pub mod rules;
pub mod text;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use extractor::{LineIndex, PatternExtractor};
pub use rules::{Rule, RuleConfig, RuleError, RuleSet};
pub use text::{decode_text, DecodeError, Decoding, TextExtensions};

/// Finding category. Serialized names match the persisted report keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "passwords")]
    Credentials,
    #[serde(rename = "urls")]
    Urls,
    #[serde(rename = "backends")]
    Backends,
    #[serde(rename = "sensitive_files")]
    SensitiveFiles,
    #[serde(rename = "red_flags")]
    RedFlags,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Credentials,
        Category::Urls,
        Category::Backends,
        Category::SensitiveFiles,
        Category::RedFlags,
    ];

    /// Categories matched against file content, in scan order.
    pub const CONTENT: [Category; 4] =
        [Category::Credentials, Category::Urls, Category::Backends, Category::RedFlags];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Credentials => "passwords",
            Category::Urls => "urls",
            Category::Backends => "backends",
            Category::SensitiveFiles => "sensitive_files",
            Category::RedFlags => "red_flags",
        }
    }

    /// Sensitive-file rules look at file names, everything else at content.
    pub fn matches_content(&self) -> bool {
        !matches!(self, Category::SensitiveFiles)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One rule match with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub file: String,
    /// 1-based line of the match start; `None` for file-name matches.
    pub line: Option<usize>,
    /// Full matched text.
    pub matched: String,
    /// First capture group when the rule has one, otherwise the full match.
    pub value: String,
    /// Source of the rule that produced this finding.
    pub pattern: String,
}
