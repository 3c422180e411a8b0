//! Lexical near-duplicate detection over token sets.
//!
//! Similarity is plain Jaccard overlap of lowercase tokens, computed
//! separately for names and descriptions and blended with fixed weights.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::loader::SkillDescriptor;
use crate::registry::SkippedCandidate;

pub const NAME_WEIGHT: f64 = 0.3;
pub const DESCRIPTION_WEIGHT: f64 = 0.7;
pub const DEFAULT_THRESHOLD: f64 = 0.5;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").unwrap());

pub type TokenSet = BTreeSet<String>;

/// Union of letter runs and hyphen/underscore/whitespace-separated parts, so
/// both `pdf` and `pdf2text` survive from `pdf2text-tool`.
#[must_use]
pub fn tokenize(text: &str) -> TokenSet {
    let lower = text.to_lowercase();
    let mut tokens: TokenSet = WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_owned())
        .collect();
    tokens.extend(
        lower
            .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::to_owned),
    );
    tokens
}

/// `|a ∩ b| / |a ∪ b|`; `0.0` when both sets are empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

#[derive(Debug, Clone)]
pub struct SimilarityResult {
    pub candidate: SkillDescriptor,
    pub name_score: f64,
    pub description_score: f64,
    pub total_score: f64,
}

impl SimilarityResult {
    fn to_entry(&self) -> SimilarityEntry<'_> {
        SimilarityEntry {
            name: &self.candidate.name,
            path: self.candidate.location.display().to_string(),
            name_similarity: percent(self.name_score),
            description_similarity: percent(self.description_score),
            total_similarity: percent(self.total_score),
        }
    }
}

fn percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

/// Score `candidate` against the skill described by `name` and `description`.
#[must_use]
pub fn compare(name: &str, description: &str, candidate: &SkillDescriptor) -> SimilarityResult {
    let name_score = jaccard(&tokenize(name), &tokenize(&candidate.name));
    let description_score = jaccard(&tokenize(description), &tokenize(&candidate.description));
    let total_score =
        (NAME_WEIGHT * name_score + DESCRIPTION_WEIGHT * description_score).clamp(0.0, 1.0);
    SimilarityResult {
        candidate: candidate.clone(),
        name_score,
        description_score,
        total_score,
    }
}

/// Compares one skill against a corpus.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    threshold: f64,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SimilarityEngine {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Candidates scoring at or above the threshold, highest first. Any
    /// candidate located at `exclude` (compared after path resolution) is
    /// left out.
    #[must_use]
    pub fn find_similar(
        &self,
        name: &str,
        description: &str,
        candidates: &[SkillDescriptor],
        exclude: Option<&Path>,
    ) -> SimilarityReport {
        let mut matches: Vec<SimilarityResult> = candidates
            .iter()
            .filter(|c| exclude.is_none_or(|path| !c.is_at(path)))
            .map(|c| compare(name, description, c))
            .filter(|r| r.total_score >= self.threshold)
            .collect();

        matches.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

        tracing::debug!(
            candidates = candidates.len(),
            matches = matches.len(),
            threshold = self.threshold,
            "similarity search finished"
        );

        SimilarityReport {
            matches,
            threshold: self.threshold,
            skipped: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimilarityReport {
    pub matches: Vec<SimilarityResult>,
    pub threshold: f64,
    /// Corpus documents that could not be compared.
    pub skipped: Vec<SkippedCandidate>,
}

#[derive(Serialize)]
struct SimilarityEntry<'a> {
    name: &'a str,
    path: String,
    name_similarity: f64,
    description_similarity: f64,
    total_similarity: f64,
}

#[derive(Serialize)]
struct SkippedEntry<'a> {
    path: String,
    reason: &'a str,
}

#[derive(Serialize)]
struct SimilaritySummary<'a> {
    similar_skills: Vec<SimilarityEntry<'a>>,
    threshold: f64,
    found_duplicates: bool,
    skipped: Vec<SkippedEntry<'a>>,
}

impl SimilarityReport {
    #[must_use]
    pub fn with_skipped(mut self, skipped: Vec<SkippedCandidate>) -> Self {
        self.skipped = skipped;
        self
    }

    #[must_use]
    pub fn found_duplicates(&self) -> bool {
        !self.matches.is_empty()
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let summary = SimilaritySummary {
            similar_skills: self.matches.iter().map(SimilarityResult::to_entry).collect(),
            threshold: percent(self.threshold),
            found_duplicates: self.found_duplicates(),
            skipped: self
                .skipped
                .iter()
                .map(|s| SkippedEntry {
                    path: s.path.display().to_string(),
                    reason: &s.reason,
                })
                .collect(),
        };
        serde_json::to_value(summary).unwrap_or_default()
    }

    #[must_use]
    pub fn format_report(&self) -> String {
        let mut out = self.format_matches();
        if !self.skipped.is_empty() {
            let _ = write!(out, "\n\nSkipped {} unreadable skill(s):", self.skipped.len());
            for s in &self.skipped {
                let _ = write!(out, "\n  - {}: {}", s.path.display(), s.reason);
            }
        }
        out
    }

    fn format_matches(&self) -> String {
        if self.matches.is_empty() {
            return "No similar skills found.".into();
        }

        let mut out = format!(
            "Found {} similar skill(s) (threshold: {:.0}%):\n\n",
            self.matches.len(),
            self.threshold * 100.0
        );
        for r in &self.matches {
            let _ = writeln!(out, "  - {}", r.candidate.name);
            let _ = writeln!(out, "    Path: {}", r.candidate.location.display());
            let _ = writeln!(out, "    Similarity: {:.1}%", r.total_score * 100.0);
            let _ = writeln!(
                out,
                "    (name: {:.1}%, description: {:.1}%)\n",
                r.name_score * 100.0,
                r.description_score * 100.0
            );
        }
        out.push_str("Consider reviewing these skills before creating a new one.");
        out
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use proptest::prelude::*;

    use super::*;

    fn set(words: &[&str]) -> TokenSet {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    fn skill(name: &str, description: &str) -> SkillDescriptor {
        SkillDescriptor::new(name, description, format!("/skills/{name}"))
    }

    #[test]
    fn tokenize_keeps_subwords_and_whole_parts() {
        let tokens = tokenize("PDF2Text_tool my-Skill");
        assert_eq!(
            tokens,
            set(&["pdf", "text", "pdf2text", "tool", "my", "skill"])
        );
    }

    #[test]
    fn tokenize_empty_text() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" - _ ").is_empty());
    }

    #[test]
    fn jaccard_of_empty_sets_is_zero() {
        assert!(jaccard(&TokenSet::new(), &TokenSet::new()).abs() < f64::EPSILON);
    }

    #[test]
    fn jaccard_partial_overlap() {
        let a = set(&["fills", "pdf", "forms"]);
        let b = set(&["fills", "pdf", "form", "fields"]);
        assert!((jaccard(&a, &b) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn identical_descriptors_score_one() {
        let r = compare("pdf-filler", "Fills PDF forms", &skill("pdf-filler", "Fills PDF forms"));
        assert!((r.total_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn near_duplicate_scores() {
        let r = compare(
            "pdf-filler",
            "Fills PDF forms",
            &skill("pdf-form-filler", "Fills PDF form fields"),
        );
        assert!((r.name_score - 2.0 / 3.0).abs() < 1e-9);
        assert!((r.description_score - 0.4).abs() < 1e-9);
        assert!((r.total_score - 0.48).abs() < 1e-9);
    }

    #[test]
    fn find_similar_filters_sorts_and_excludes() {
        let dir = tempfile::tempdir().unwrap();
        let own = SkillDescriptor::new("pdf-filler", "Fills PDF forms", dir.path());
        let corpus = vec![
            skill("image-resizer", "Resizes images"),
            skill("pdf-filler-pro", "Fills PDF forms quickly"),
            skill("pdf-filler", "Fills PDF forms"),
            own,
        ];

        let report = SimilarityEngine::default().find_similar(
            "pdf-filler",
            "Fills PDF forms",
            &corpus,
            Some(dir.path()),
        );

        let names: Vec<_> = report.matches.iter().map(|r| r.candidate.name.as_str()).collect();
        assert_eq!(names, ["pdf-filler", "pdf-filler-pro"]);
        assert!(report.found_duplicates());
        assert!(report.matches[0].total_score >= report.matches[1].total_score);
    }

    #[test]
    fn lower_threshold_admits_near_duplicate() {
        let corpus = vec![skill("pdf-form-filler", "Fills PDF form fields")];
        let strict = SimilarityEngine::default().find_similar("pdf-filler", "Fills PDF forms", &corpus, None);
        let loose = SimilarityEngine::new(0.45).find_similar("pdf-filler", "Fills PDF forms", &corpus, None);
        assert!(!strict.found_duplicates());
        assert_eq!(loose.matches.len(), 1);
    }

    #[test]
    fn json_uses_rounded_percentages() {
        let corpus = vec![skill("pdf-form-filler", "Fills PDF form fields")];
        let report = SimilarityEngine::new(0.4).find_similar("pdf-filler", "Fills PDF forms", &corpus, None);
        let json = report.to_json();
        assert_eq!(json["threshold"], 40.0);
        assert_eq!(json["found_duplicates"], true);
        let entry = &json["similar_skills"][0];
        assert_eq!(entry["name"], "pdf-form-filler");
        assert_eq!(entry["path"], "/skills/pdf-form-filler");
        assert_eq!(entry["name_similarity"], 66.7);
        assert_eq!(entry["description_similarity"], 40.0);
        assert_eq!(entry["total_similarity"], 48.0);
    }

    #[test]
    fn empty_report_text() {
        let report = SimilarityEngine::default().find_similar("x", "y", &[], None);
        assert_eq!(report.format_report(), "No similar skills found.");
        assert_eq!(report.to_json()["found_duplicates"], false);
        assert_eq!(report.to_json()["skipped"], serde_json::json!([]));
    }

    #[test]
    fn skipped_candidates_are_reported() {
        let report = SimilarityEngine::default()
            .find_similar("x", "y", &[], None)
            .with_skipped(vec![SkippedCandidate {
                path: PathBuf::from("/skills/broken/SKILL.md"),
                reason: "no header".into(),
            }]);

        let json = report.to_json();
        assert_eq!(json["found_duplicates"], false);
        assert_eq!(json["skipped"][0]["path"], "/skills/broken/SKILL.md");
        assert_eq!(json["skipped"][0]["reason"], "no header");
        assert_eq!(
            report.format_report(),
            "No similar skills found.\n\nSkipped 1 unreadable skill(s):\n  - /skills/broken/SKILL.md: no header"
        );
    }

    #[test]
    fn report_text_lists_matches() {
        let corpus = vec![skill("pdf-filler", "Fills PDF forms")];
        let report = SimilarityEngine::default().find_similar("pdf-filler", "Fills PDF forms", &corpus, None);
        let text = report.format_report();
        assert!(text.starts_with("Found 1 similar skill(s) (threshold: 50%):"));
        assert!(text.contains("  - pdf-filler\n    Path: /skills/pdf-filler\n    Similarity: 100.0%"));
        assert!(text.ends_with("Consider reviewing these skills before creating a new one."));
    }

    proptest! {
        #[test]
        fn jaccard_is_bounded(a in prop::collection::btree_set("[a-e]{1,3}", 0..8),
                              b in prop::collection::btree_set("[a-e]{1,3}", 0..8)) {
            let s = jaccard(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
            prop_assert!((s - jaccard(&b, &a)).abs() < f64::EPSILON);
        }

        #[test]
        fn jaccard_is_reflexive(a in prop::collection::btree_set("[a-z]{1,6}", 1..8)) {
            prop_assert!((jaccard(&a, &a) - 1.0).abs() < f64::EPSILON);
        }

        #[test]
        fn total_score_is_bounded(n1 in "[a-z -]{0,20}", d1 in "[a-zA-Z _-]{0,40}",
                                  n2 in "[a-z -]{0,20}", d2 in "[a-zA-Z _-]{0,40}") {
            let r = compare(&n1, &d1, &skill(&n2, &d2));
            prop_assert!((0.0..=1.0).contains(&r.total_score));
        }
    }
}
