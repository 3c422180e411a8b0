//! Markdown body analysis shared by the validator and the evolution scorer.
//!
//! Everything here is a pure function of document text. Section headings are
//! matched loosely (`##` anywhere, case-insensitive) so `### Triggers` and
//! `## triggers` both count.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static TRIGGERS_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*Triggers?\s*\n").unwrap());
static EXTENSION_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*Extension\s*Points?\s*\n").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*-\s+").unwrap());
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:\d+\.|[-*])\s+").unwrap());
static ANTI_PATTERNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*(?:Anti-Patterns|Anti Patterns)").unwrap());
static RATIONALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*(?:WHY|Design Rationale|Design Reason)").unwrap());
static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n.*?```").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Text between the heading matched by `heading` and the next `\n##`.
fn section<'a>(content: &'a str, heading: &Regex) -> Option<&'a str> {
    let start = heading.find(content)?.end();
    let rest = &content[start..];
    Some(rest.find("\n##").map_or(rest, |end| &rest[..end]))
}

/// Number of `- ` bullets under the Triggers heading.
#[must_use]
pub fn count_triggers(content: &str) -> usize {
    section(content, &TRIGGERS_HEADING_RE).map_or(0, |s| BULLET_RE.find_iter(s).count())
}

/// Number of numbered or bulleted items under the Extension Points heading.
#[must_use]
pub fn count_extension_points(content: &str) -> usize {
    section(content, &EXTENSION_HEADING_RE).map_or(0, |s| LIST_ITEM_RE.find_iter(s).count())
}

#[must_use]
pub fn has_anti_patterns_section(content: &str) -> bool {
    ANTI_PATTERNS_RE.is_match(content)
}

#[must_use]
pub fn has_rationale_section(content: &str) -> bool {
    RATIONALE_RE.is_match(content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    ClaudeModel,
    GptModel,
    Semantic,
    Package,
}

impl VersionKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ClaudeModel => "Claude model version",
            Self::GptModel => "GPT model version",
            Self::Semantic => "Semantic version",
            Self::Package => "Package version",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMatch {
    pub text: String,
    pub kind: VersionKind,
}

impl std::fmt::Display for VersionMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.text, self.kind.label())
    }
}

static VERSION_PATTERNS: LazyLock<Vec<(VersionKind, Regex)>> = LazyLock::new(|| {
    [
        (VersionKind::ClaudeModel, r"claude-\d+-\d+-\w+-\d{8}"),
        (VersionKind::GptModel, r"gpt-\d+\.?\d*-\w+-\d{4}"),
        (VersionKind::Semantic, r"v\d+\.\d+\.\d+"),
        (VersionKind::Package, r"@\d+\.\d+\.\d+"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

/// All hardcoded model or package versions, grouped by pattern in the order
/// Claude, GPT, semantic, package.
#[must_use]
pub fn find_hardcoded_versions(content: &str) -> Vec<VersionMatch> {
    let mut found = Vec::new();
    for (kind, re) in VERSION_PATTERNS.iter() {
        for m in re.find_iter(content) {
            let text = if *kind == VersionKind::Semantic {
                match standalone_semver(content, m.start(), m.end()) {
                    Some(text) => text,
                    None => continue,
                }
            } else {
                m.as_str()
            };
            found.push(VersionMatch {
                text: text.to_owned(),
                kind: *kind,
            });
        }
    }
    found
}

/// A `vX.Y.Z` match counts only when no ASCII letter touches either end. A
/// trailing letter is tolerated by giving up the final digit, provided at
/// least one digit remains (`v1.2.34a` reports `v1.2.3`).
fn standalone_semver(content: &str, start: usize, end: usize) -> Option<&str> {
    let bytes = content.as_bytes();
    if start > 0 && bytes[start - 1].is_ascii_alphabetic() {
        return None;
    }
    if end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        let last_run = bytes[start..end]
            .iter()
            .rev()
            .take_while(|b| b.is_ascii_digit())
            .count();
        return (last_run > 1).then(|| &content[start..end - 1]);
    }
    Some(&content[start..end])
}

/// Drop ```-fenced code blocks.
#[must_use]
pub fn strip_code_blocks(content: &str) -> Cow<'_, str> {
    CODE_BLOCK_RE.replace_all(content, "")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    pub text: String,
    pub target: String,
}

/// Links outside fenced code that point at local files: no URL scheme, no
/// in-page anchor. A `#fragment` suffix is removed from the target.
#[must_use]
pub fn relative_links(content: &str) -> Vec<MarkdownLink> {
    let stripped = strip_code_blocks(content);
    LINK_RE
        .captures_iter(&stripped)
        .filter_map(|caps| {
            let text = caps.get(1)?.as_str();
            let target = caps.get(2)?.as_str().trim();
            if target.starts_with('#') || is_external(target) {
                return None;
            }
            let path = target.split('#').next().unwrap_or(target);
            Some(MarkdownLink {
                text: text.to_owned(),
                target: path.to_owned(),
            })
        })
        .collect()
}

fn is_external(target: &str) -> bool {
    ["http://", "https://", "mailto:"]
        .iter()
        .any(|scheme| target.starts_with(scheme))
}
