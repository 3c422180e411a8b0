//! Structural and content validation of a skill document.
//!
//! Two pre-checks (document present, header parses) gate everything else.
//! Past them, every rule in [`RULES`] runs unconditionally and contributes one
//! [`CheckOutcome`]; only error-severity outcomes make a skill invalid.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::content::{
    count_extension_points, count_triggers, find_hardcoded_versions, has_anti_patterns_section,
    has_rationale_section, relative_links,
};
use crate::error::SkillError;
use crate::evolution::{self, EvolutionScore, MIN_EXTENSION_POINTS, THRESHOLD};
use crate::frontmatter::{Header, HeaderParser, default_parser, normalize_newlines};
use crate::loader::{SkillPaths, read_document};
use crate::scripts::check_scripts;

pub const ALLOWED_KEYS: [&str; 5] = ["name", "description", "license", "allowed-tools", "metadata"];
pub const MAX_NAME_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 1024;
pub const MIN_TRIGGERS: usize = 3;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Pass,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Reported for information only (the embedded evolution score).
    pub informational: bool,
}

impl CheckOutcome {
    fn new(name: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name,
            severity,
            message: message.into(),
            informational: false,
        }
    }

    /// `[PASS] name: message` style line used by the text and JSON reports.
    #[must_use]
    pub fn line(&self) -> String {
        let tag = match (self.informational, self.severity) {
            (true, _) => "INFO",
            (false, Severity::Pass) => "PASS",
            (false, Severity::Warning) => "WARN",
            (false, Severity::Error) => "FAIL",
        };
        format!("[{tag}] {}: {}", self.name, self.message)
    }
}

/// Why validation stopped before the rule battery ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precheck {
    DocumentMissing,
    DocumentUnreadable,
    HeaderInvalid,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub skill_dir: PathBuf,
    pub outcomes: Vec<CheckOutcome>,
    pub header: Option<Header>,
    pub evolution: Option<EvolutionScore>,
    pub precheck: Option<Precheck>,
}

impl ValidationReport {
    fn with_outcomes(&self, severity: Severity) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(move |o| o.severity == severity)
    }

    pub fn passed(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.with_outcomes(Severity::Pass)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.with_outcomes(Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.with_outcomes(Severity::Error)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let passed = self.passed().count();
        let warnings = self.warnings().count();
        let errors = self.errors().count();
        format!(
            "{passed}/{} passed, {warnings} warnings, {errors} errors",
            self.outcomes.len()
        )
    }

    /// Outcomes grouped by severity (errors first) followed by the summary.
    /// `verbose` adds the evolution suggestions when the score is below
    /// threshold.
    #[must_use]
    pub fn format_report(&self, verbose: bool) -> String {
        let mut sections = Vec::new();
        for (title, severity) in [
            ("ERRORS", Severity::Error),
            ("WARNINGS", Severity::Warning),
            ("PASSED", Severity::Pass),
        ] {
            let lines: Vec<String> = self.with_outcomes(severity).map(CheckOutcome::line).collect();
            if !lines.is_empty() {
                sections.push(format!("=== {title} ===\n{}", lines.join("\n")));
            }
        }
        if verbose
            && let Some(score) = &self.evolution
            && !score.meets_threshold()
            && !score.suggestions.is_empty()
        {
            let lines: Vec<String> = score
                .suggestions
                .iter()
                .map(|s| format!("[INFO] suggestion: {s}"))
                .collect();
            sections.push(format!("=== SUGGESTIONS ===\n{}", lines.join("\n")));
        }
        sections.push(self.summary());
        sections.join("\n\n")
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let lines = |severity| {
            self.with_outcomes(severity)
                .map(CheckOutcome::line)
                .collect::<Vec<_>>()
        };
        serde_json::json!({
            "passed": lines(Severity::Pass),
            "warnings": lines(Severity::Warning),
            "errors": lines(Severity::Error),
            "is_valid": self.is_valid(),
            "summary": self.summary(),
            "evolution": self.evolution.as_ref().map(EvolutionScore::to_json),
        })
    }
}

/// Everything a rule may inspect.
struct SkillContext<'a> {
    dir: &'a Path,
    content: &'a str,
    header: &'a Header,
    evolution: &'a EvolutionScore,
}

enum Verdict {
    Pass(String),
    Fail(String),
    /// Precondition absent (e.g. no `name` to format-check); no outcome.
    Skip,
}

struct Rule {
    name: &'static str,
    on_failure: Severity,
    informational: bool,
    eval: fn(&SkillContext<'_>) -> Verdict,
}

const fn rule(name: &'static str, on_failure: Severity, eval: fn(&SkillContext<'_>) -> Verdict) -> Rule {
    Rule {
        name,
        on_failure,
        informational: false,
        eval,
    }
}

const RULES: &[Rule] = &[
    rule("properties", Severity::Error, check_properties),
    rule("name", Severity::Error, check_name_present),
    rule("description", Severity::Error, check_description_present),
    rule("name_format", Severity::Error, check_name_format),
    rule("description_format", Severity::Error, check_description_format),
    rule("triggers", Severity::Warning, check_triggers),
    rule("extension_points", Severity::Warning, check_extension_points),
    rule("anti_patterns", Severity::Warning, check_anti_patterns),
    rule("why_section", Severity::Warning, check_rationale),
    rule("no_hardcoded_versions", Severity::Warning, check_versions),
    rule("internal_links", Severity::Warning, check_links),
    rule("script_syntax", Severity::Error, check_script_syntax),
    Rule {
        name: "evolution_score",
        on_failure: Severity::Warning,
        informational: true,
        eval: check_evolution,
    },
];

fn check_properties(ctx: &SkillContext<'_>) -> Verdict {
    let unexpected: BTreeSet<&str> = ctx
        .header
        .keys()
        .filter(|k| !ALLOWED_KEYS.contains(k))
        .collect();
    if unexpected.is_empty() {
        Verdict::Pass("All properties valid".into())
    } else {
        let keys: Vec<&str> = unexpected.into_iter().collect();
        Verdict::Fail(format!("Unexpected keys: {}", keys.join(", ")))
    }
}

fn check_name_present(ctx: &SkillContext<'_>) -> Verdict {
    if ctx.header.contains_key("name") {
        Verdict::Pass("Name field present".into())
    } else {
        Verdict::Fail("Name field missing".into())
    }
}

fn check_description_present(ctx: &SkillContext<'_>) -> Verdict {
    if ctx.header.contains_key("description") {
        Verdict::Pass("Description field present".into())
    } else {
        Verdict::Fail("Description field missing".into())
    }
}

/// Problems with a skill name; empty when it is valid hyphen-case.
#[must_use]
pub fn name_problems(name: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if !NAME_RE.is_match(name) {
        problems.push("must contain only lowercase letters, digits, and hyphens".to_owned());
    }
    if name.starts_with('-') || name.ends_with('-') {
        problems.push("must not start or end with '-'".to_owned());
    }
    if name.contains("--") {
        problems.push("must not contain '--'".to_owned());
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        problems.push(format!("must be at most {MAX_NAME_LEN} characters (got {len})"));
    }
    problems
}

fn check_name_format(ctx: &SkillContext<'_>) -> Verdict {
    let Some(name) = ctx.header.get("name") else {
        return Verdict::Skip;
    };
    let name = name.trim();
    let problems = name_problems(name);
    if problems.is_empty() {
        Verdict::Pass(format!("Name '{name}' follows hyphen-case convention"))
    } else {
        Verdict::Fail(format!("Name '{name}' {}", problems.join("; ")))
    }
}

/// Problems with a description; empty when it is acceptable.
#[must_use]
pub fn description_problems(description: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if description.contains(['<', '>']) {
        problems.push("must not contain '<' or '>'".to_owned());
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        problems.push(format!(
            "must be at most {MAX_DESCRIPTION_LEN} characters (got {len})"
        ));
    }
    problems
}

fn check_description_format(ctx: &SkillContext<'_>) -> Verdict {
    let Some(description) = ctx.header.get("description") else {
        return Verdict::Skip;
    };
    let problems = description_problems(description.trim());
    if problems.is_empty() {
        Verdict::Pass("Description format valid".into())
    } else {
        Verdict::Fail(format!("Description {}", problems.join("; ")))
    }
}

fn check_triggers(ctx: &SkillContext<'_>) -> Verdict {
    let count = count_triggers(ctx.content);
    let message = format!("Has {count} triggers (recommended: {MIN_TRIGGERS}+)");
    if count >= MIN_TRIGGERS {
        Verdict::Pass(message)
    } else {
        Verdict::Fail(message)
    }
}

fn check_extension_points(ctx: &SkillContext<'_>) -> Verdict {
    let count = count_extension_points(ctx.content);
    let message = format!("Has {count} extension points (recommended: {MIN_EXTENSION_POINTS}+)");
    if count >= MIN_EXTENSION_POINTS {
        Verdict::Pass(message)
    } else {
        Verdict::Fail(message)
    }
}

fn check_anti_patterns(ctx: &SkillContext<'_>) -> Verdict {
    if has_anti_patterns_section(ctx.content) {
        Verdict::Pass("Anti-patterns section exists".into())
    } else {
        Verdict::Fail("No Anti-Patterns section".into())
    }
}

fn check_rationale(ctx: &SkillContext<'_>) -> Verdict {
    if has_rationale_section(ctx.content) {
        Verdict::Pass("Design rationale (WHY) section exists".into())
    } else {
        Verdict::Fail("No WHY/Design Rationale section".into())
    }
}

fn check_versions(ctx: &SkillContext<'_>) -> Verdict {
    let found = find_hardcoded_versions(ctx.content);
    if found.is_empty() {
        Verdict::Pass("No hardcoded version strings".into())
    } else {
        let shown: Vec<String> = found.iter().take(3).map(ToString::to_string).collect();
        Verdict::Fail(format!("Hardcoded versions: {}", shown.join(", ")))
    }
}

fn check_links(ctx: &SkillContext<'_>) -> Verdict {
    let invalid: Vec<String> = relative_links(ctx.content)
        .into_iter()
        .filter(|link| !ctx.dir.join(&link.target).exists())
        .map(|link| format!("{} (referenced as '{}')", link.target, link.text))
        .collect();
    if invalid.is_empty() {
        Verdict::Pass("All internal links valid".into())
    } else {
        Verdict::Fail(format!("Invalid links: {}", invalid.join(", ")))
    }
}

fn check_script_syntax(ctx: &SkillContext<'_>) -> Verdict {
    let issues = check_scripts(ctx.dir);
    if issues.is_empty() {
        Verdict::Pass("All bundled scripts valid".into())
    } else {
        let lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
        Verdict::Fail(format!("Syntax errors: {}", lines.join("; ")))
    }
}

fn check_evolution(ctx: &SkillContext<'_>) -> Verdict {
    let total = ctx.evolution.total();
    let max = ctx.evolution.max_total();
    if ctx.evolution.meets_threshold() {
        Verdict::Pass(format!("{total}/{max} (meets recommended threshold)"))
    } else {
        Verdict::Fail(format!("{total}/{max} (recommended: {THRESHOLD}+)"))
    }
}

/// Runs the check battery against one skill.
pub struct StructuralValidator<'p> {
    parser: &'p dyn HeaderParser,
}

impl Default for StructuralValidator<'static> {
    fn default() -> Self {
        Self::new(default_parser())
    }
}

impl<'p> StructuralValidator<'p> {
    #[must_use]
    pub fn new(parser: &'p dyn HeaderParser) -> Self {
        Self { parser }
    }

    /// Validate the skill at `path` (a skill directory or its `SKILL.md`).
    #[must_use]
    pub fn validate(&self, path: &Path) -> ValidationReport {
        let paths = SkillPaths::locate(path);
        let mut report = ValidationReport {
            skill_dir: paths.dir.clone(),
            outcomes: Vec::new(),
            header: None,
            evolution: None,
            precheck: None,
        };

        let (content, document) = match read_document(&paths.document, self.parser) {
            Ok(parsed) => parsed,
            Err(e) => {
                let (name, precheck) = match &e {
                    SkillError::NotFound(_) => ("skill_md", Precheck::DocumentMissing),
                    e if e.is_header_error() => ("frontmatter", Precheck::HeaderInvalid),
                    _ => ("skill_md", Precheck::DocumentUnreadable),
                };
                tracing::warn!(path = %paths.document.display(), error = %e, "validation stopped");
                report
                    .outcomes
                    .push(CheckOutcome::new(name, Severity::Error, e.to_string()));
                report.precheck = Some(precheck);
                return report;
            }
        };

        report
            .outcomes
            .push(CheckOutcome::new("skill_md", Severity::Pass, "SKILL.md exists"));
        report.outcomes.push(CheckOutcome::new(
            "frontmatter",
            Severity::Pass,
            format!("Valid header ({} parser)", self.parser.name()),
        ));

        let content = normalize_newlines(&content);
        let evolution = evolution::score(&content);
        let ctx = SkillContext {
            dir: &paths.dir,
            content: &content,
            header: &document.header,
            evolution: &evolution,
        };

        for rule in RULES {
            let (severity, message) = match (rule.eval)(&ctx) {
                Verdict::Pass(m) => (Severity::Pass, m),
                Verdict::Fail(m) => (rule.on_failure, m),
                Verdict::Skip => continue,
            };
            report.outcomes.push(CheckOutcome {
                name: rule.name,
                severity,
                message,
                informational: rule.informational,
            });
        }

        tracing::info!(
            skill = %paths.dir.display(),
            summary = %report.summary(),
            "validation finished"
        );
        report.header = Some(document.header);
        report.evolution = Some(evolution);
        report
    }
}
