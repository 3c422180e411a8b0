//! Evolution score: an additive 0-10 rubric estimating how ready a skill is
//! for future extension.
//!
//! Every item is worth exactly 0 or [`ITEM_POINTS`], so totals are always even.
//! With [`THRESHOLD`] at 7 the effective passing total is 8.

use std::fmt::Write as _;

use serde::Serialize;

use crate::content::{
    count_extension_points, find_hardcoded_versions, has_anti_patterns_section,
    has_rationale_section,
};

pub const ITEM_POINTS: u32 = 2;
pub const THRESHOLD: u32 = 7;
pub const MIN_EXTENSION_POINTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricItem {
    pub name: &'static str,
    pub passed: bool,
    pub points: u32,
    pub max_points: u32,
    pub evidence: String,
}

impl RubricItem {
    fn new(name: &'static str, passed: bool, evidence: String) -> Self {
        Self {
            name,
            passed,
            points: if passed { ITEM_POINTS } else { 0 },
            max_points: ITEM_POINTS,
            evidence,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvolutionScore {
    pub items: Vec<RubricItem>,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
struct ScoreSummary<'a> {
    score: u32,
    max_score: u32,
    meets_threshold: bool,
    threshold: u32,
    items: &'a [RubricItem],
    suggestions: &'a [String],
}

impl EvolutionScore {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.items.iter().map(|i| i.points).sum()
    }

    #[must_use]
    pub fn max_total(&self) -> u32 {
        self.items.iter().map(|i| i.max_points).sum()
    }

    #[must_use]
    pub fn meets_threshold(&self) -> bool {
        self.total() >= THRESHOLD
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let summary = ScoreSummary {
            score: self.total(),
            max_score: self.max_total(),
            meets_threshold: self.meets_threshold(),
            threshold: THRESHOLD,
            items: &self.items,
            suggestions: &self.suggestions,
        };
        serde_json::to_value(summary).unwrap_or_default()
    }

    #[must_use]
    pub fn format_report(&self) -> String {
        let verdict = if self.meets_threshold() {
            "PASS"
        } else {
            "BELOW THRESHOLD"
        };
        let mut out = format!(
            "Evolution Score: {}/{}\nThreshold: {THRESHOLD} ({verdict})\n\nBreakdown:\n",
            self.total(),
            self.max_total()
        );
        for item in &self.items {
            let mark = if item.passed { '✓' } else { '✗' };
            let _ = writeln!(
                out,
                "  {mark} {}: {}/{}\n    {}",
                item.name, item.points, item.max_points, item.evidence
            );
        }
        if !self.suggestions.is_empty() {
            out.push_str("\nSuggestions for improvement:\n");
            for (i, s) in self.suggestions.iter().enumerate() {
                let _ = writeln!(out, "  {}. {s}", i + 1);
            }
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Score document text. The result depends on `content` alone.
#[must_use]
pub fn score(content: &str) -> EvolutionScore {
    let mut result = EvolutionScore::default();

    result.items.push(RubricItem::new(
        "base_score",
        true,
        "Base score always granted".into(),
    ));

    let ext_count = count_extension_points(content);
    let ext_passed = ext_count >= MIN_EXTENSION_POINTS;
    result.items.push(RubricItem::new(
        "extension_points",
        ext_passed,
        format!("Found {ext_count} extension points (need {MIN_EXTENSION_POINTS}+)"),
    ));
    if !ext_passed {
        result.suggestions.push(format!(
            "Add extension points section with at least {MIN_EXTENSION_POINTS} items (current: {ext_count})"
        ));
    }

    let versions = find_hardcoded_versions(content);
    let no_versions = versions.is_empty();
    let evidence = if no_versions {
        "No hardcoded versions".to_owned()
    } else {
        let shown: Vec<String> = versions.iter().take(3).map(ToString::to_string).collect();
        format!("Found: {}", shown.join(", "))
    };
    result
        .items
        .push(RubricItem::new("no_hardcoded_versions", no_versions, evidence));
    if !no_versions {
        result
            .suggestions
            .push("Remove hardcoded version strings, use configurable defaults instead".into());
    }

    let has_why = has_rationale_section(content);
    result.items.push(RubricItem::new(
        "why_documented",
        has_why,
        if has_why {
            "Design rationale section exists".into()
        } else {
            "No WHY/Design Rationale section".into()
        },
    ));
    if !has_why {
        result.suggestions.push(
            "Add '## Design Rationale' or '## WHY' section explaining design decisions".into(),
        );
    }

    let has_anti = has_anti_patterns_section(content);
    result.items.push(RubricItem::new(
        "anti_patterns",
        has_anti,
        if has_anti {
            "Anti-patterns section exists".into()
        } else {
            "No Anti-Patterns section".into()
        },
    ));
    if !has_anti {
        result
            .suggestions
            .push("Add '## Anti-Patterns' section documenting what to avoid".into());
    }

    tracing::debug!(score = result.total(), "evolution score computed");
    result
}
