//! The pre-flight gate run before a skill is packaged.
//!
//! Validation runs first and can end the gate on its own. Otherwise the skill
//! is compared against the configured corpus and each advisory (duplicates,
//! low evolution score) is put to a [`Confirm`] implementation unless the
//! configuration assumes yes.

use std::path::{Path, PathBuf};

use skillgate_skills::frontmatter::{HeaderParser, default_parser};
use skillgate_skills::registry::SkillRepository;
use skillgate_skills::report::Report;
use skillgate_skills::similarity::{SimilarityEngine, SimilarityReport};
use skillgate_skills::validator::StructuralValidator;

use crate::config::Config;

/// Asks the operator whether to continue past an advisory.
pub trait Confirm {
    /// # Errors
    ///
    /// Returns an error when no answer can be obtained (e.g. no terminal).
    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool>;
}

/// Scan `roots` and rank their skills against `name`/`description`. Corpus
/// documents the scan could not load are carried on the report.
#[must_use]
pub fn find_duplicates(
    roots: &[PathBuf],
    parser: &dyn HeaderParser,
    threshold: f64,
    name: &str,
    description: &str,
    exclude: Option<&Path>,
) -> SimilarityReport {
    let scan = SkillRepository::new(roots.iter().cloned()).scan(parser);
    SimilarityEngine::new(threshold)
        .find_similar(name, description, &scan.skills, exclude)
        .with_skipped(scan.skipped)
}

pub struct Gate<'a> {
    config: &'a Config,
    roots: Vec<PathBuf>,
    parser: &'a dyn HeaderParser,
}

impl<'a> Gate<'a> {
    #[must_use]
    pub fn new(config: &'a Config, roots: Vec<PathBuf>) -> Self {
        Self {
            config,
            roots,
            parser: default_parser(),
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: &'a dyn HeaderParser) -> Self {
        self.parser = parser;
        self
    }

    /// Run the gate on the skill at `skill`. The returned report always
    /// carries everything computed so far; its exit status says how the gate
    /// ended.
    pub fn run(&self, skill: &Path, confirm: &mut dyn Confirm) -> Report {
        let validation = StructuralValidator::new(self.parser).validate(skill);
        let mut report = Report::new(validation)
            .strict(self.config.validation.strict)
            .verbose(self.config.validation.verbose);

        if report.validation.precheck.is_some() || report.is_blocked() {
            tracing::info!(status = %report.exit_status(), "gate stopped after validation");
            return report;
        }

        let header = report.validation.header.clone().unwrap_or_default();
        let similarity = find_duplicates(
            &self.roots,
            self.parser,
            self.config.similarity.threshold,
            header.get("name").unwrap_or_default().trim(),
            header.get("description").unwrap_or_default().trim(),
            Some(&report.validation.skill_dir),
        );
        report = report.with_similarity(similarity);

        for advisory in report.advisories() {
            if self.config.gate.assume_yes {
                tracing::info!(advisory = advisory.as_str(), "continuing without prompt");
                continue;
            }
            let accepted = match confirm.confirm(advisory.prompt()) {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::warn!("confirmation unavailable, treating as declined: {e:#}");
                    false
                }
            };
            if !accepted {
                report.declined = Some(advisory);
                break;
            }
        }

        tracing::info!(status = %report.exit_status(), "gate finished");
        report
    }
}
