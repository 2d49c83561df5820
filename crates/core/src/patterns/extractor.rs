use super::{Category, Finding, Rule, RuleSet};

/// Offsets of every `\n` in a text, for mapping byte offsets to lines.
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let newlines =
            text.bytes().enumerate().filter(|(_, b)| *b == b'\n').map(|(i, _)| i).collect();
        Self { newlines }
    }

    /// 1-based line containing `offset`: newlines strictly before it, plus one.
    pub fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&pos| pos < offset) + 1
    }
}

/// Applies categorized rules to text and file names.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    rules: RuleSet,
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new(RuleSet::builtin())
    }
}

impl PatternExtractor {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Match every content rule against `text`.
    ///
    /// Results are ordered by category, then rule, then position. Overlapping
    /// matches from different rules are all kept.
    pub fn scan_text(&self, file: &str, text: &str) -> Vec<Finding> {
        let lines = LineIndex::new(text);
        let mut findings = Vec::new();
        for category in Category::CONTENT {
            for rule in self.rules.rules(category) {
                collect_matches(category, rule, file, text, &lines, &mut findings);
            }
        }
        findings
    }

    /// Match sensitive-file rules against a file name.
    pub fn scan_file_name(&self, file: &str, name: &str) -> Vec<Finding> {
        self.rules
            .rules(Category::SensitiveFiles)
            .iter()
            .filter_map(|rule| {
                let m = rule.regex.find(name)?;
                Some(Finding {
                    category: Category::SensitiveFiles,
                    file: file.to_string(),
                    line: None,
                    matched: m.as_str().to_string(),
                    value: name.to_string(),
                    pattern: rule.pattern.clone(),
                })
            })
            .collect()
    }
}

fn collect_matches(
    category: Category,
    rule: &Rule,
    file: &str,
    text: &str,
    lines: &LineIndex,
    out: &mut Vec<Finding>,
) {
    let has_capture = rule.has_capture();
    for caps in rule.regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let value = if has_capture { caps.get(1).unwrap_or(whole) } else { whole };
        out.push(Finding {
            category,
            file: file.to_string(),
            line: Some(lines.line_of(whole.start())),
            matched: whole.as_str().to_string(),
            value: value.as_str().to_string(),
            pattern: rule.pattern.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_counts_preceding_newlines() {
        let index = LineIndex::new("a\nb\n\nc");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(1), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(5), 4);
    }
}
