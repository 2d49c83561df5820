use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Category;

const DEFAULT_CREDENTIAL_PATTERNS: &[&str] = &[
    r#"password\s*=\s*["']([^"']+)["']"#,
    r#"pwd\s*=\s*["']([^"']+)["']"#,
    r#"passwd\s*=\s*["']([^"']+)["']"#,
    r#"secret\s*=\s*["']([^"']+)["']"#,
    r#"api[_-]?key\s*=\s*["']([^"']+)["']"#,
    r#"apikey\s*=\s*["']([^"']+)["']"#,
    r#"token\s*=\s*["']([^"']+)["']"#,
    r#"auth[_-]?token\s*=\s*["']([^"']+)["']"#,
    r#"private[_-]?key\s*=\s*["']([^"']+)["']"#,
    r#"client[_-]?secret\s*=\s*["']([^"']+)["']"#,
    r#"access[_-]?token\s*=\s*["']([^"']+)["']"#,
    r#"encryption[_-]?key\s*=\s*["']([^"']+)["']"#,
    r#"aws[_-]?secret\s*=\s*["']([^"']+)["']"#,
    r#"db[_-]?password\s*=\s*["']([^"']+)["']"#,
];

const DEFAULT_URL_PATTERNS: &[&str] = &[
    r#"https?://[^\s'"<>]+"#,
    r#"wss?://[^\s'"<>]+"#,
    r#"mqtt://[^\s'"<>]+"#,
    r#"ftp://[^\s'"<>]+"#,
];

const DEFAULT_BACKEND_PATTERNS: &[&str] = &[
    r#"/api/[^\s'"<>]+"#,
    r#"/v\d+/[^\s'"<>]+"#,
    r#"endpoint\s*=\s*["']([^"']+)["']"#,
    r#"baseUrl\s*=\s*["']([^"']+)["']"#,
    r#"BASE_URL\s*=\s*["']([^"']+)["']"#,
    r#"API_URL\s*=\s*["']([^"']+)["']"#,
    r#"SERVER_URL\s*=\s*["']([^"']+)["']"#,
];

const DEFAULT_SENSITIVE_FILE_PATTERNS: &[&str] = &[
    r"\.key$",
    r"\.pem$",
    r"\.p12$",
    r"\.jks$",
    r"\.keystore$",
    r"\.db$",
    r"\.sqlite$",
    r"config\.json$",
    r"secrets\.json$",
    r"\.env$",
    r"credentials",
    r"private",
];

const DEFAULT_RED_FLAG_PATTERNS: &[&str] = &[
    r"TODO.*security",
    r"FIXME.*security",
    r"XXX.*security",
    r"hardcoded",
    r"bypass",
    r"debug.*true",
    r"ssl.*verify.*false",
    r"verify.*false",
    r"allowBackup.*true",
    r"debuggable.*true",
    r"usesCleartextTraffic.*true",
    r"ACCEPT_ALL",
    r"TrustAllCerts",
    r"HostnameVerifier",
];

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

/// Rule sources per category, as written in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub passwords: Vec<String>,
    pub urls: Vec<String>,
    pub backends: Vec<String>,
    pub sensitive_files: Vec<String>,
    pub red_flags: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            passwords: owned(DEFAULT_CREDENTIAL_PATTERNS),
            urls: owned(DEFAULT_URL_PATTERNS),
            backends: owned(DEFAULT_BACKEND_PATTERNS),
            sensitive_files: owned(DEFAULT_SENSITIVE_FILE_PATTERNS),
            red_flags: owned(DEFAULT_RED_FLAG_PATTERNS),
        }
    }
}

impl RuleConfig {
    pub fn patterns(&self, category: Category) -> &[String] {
        match category {
            Category::Credentials => &self.passwords,
            Category::Urls => &self.urls,
            Category::Backends => &self.backends,
            Category::SensitiveFiles => &self.sensitive_files,
            Category::RedFlags => &self.red_flags,
        }
    }

    /// Compile every pattern case-insensitively, keeping table order.
    pub fn compile(&self) -> Result<RuleSet, RuleError> {
        let mut groups = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let rules = self
                .patterns(category)
                .iter()
                .map(|pattern| Rule::compile(category, pattern))
                .collect::<Result<Vec<_>, _>>()?;
            groups.push((category, rules));
        }
        Ok(RuleSet { groups })
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid {category} rule '{pattern}': {source}")]
    InvalidPattern {
        category: Category,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: String,
    pub regex: Regex,
}

impl Rule {
    pub fn compile(category: Category, pattern: &str) -> Result<Self, RuleError> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build().map_err(|source| {
            RuleError::InvalidPattern { category, pattern: pattern.to_string(), source }
        })?;
        Ok(Self { pattern: pattern.to_string(), regex })
    }

    /// Whether the rule defines at least one capture group.
    pub fn has_capture(&self) -> bool {
        self.regex.captures_len() > 1
    }
}

/// Compiled rules grouped by category.
#[derive(Debug, Clone)]
pub struct RuleSet {
    groups: Vec<(Category, Vec<Rule>)>,
}

impl RuleSet {
    /// The built-in tables. These are constants and always compile.
    pub fn builtin() -> Self {
        RuleConfig::default().compile().expect("built-in rule tables compile")
    }

    pub fn rules(&self, category: Category) -> &[Rule] {
        self.groups
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, rules)| rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
