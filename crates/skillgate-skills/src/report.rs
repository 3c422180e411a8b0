//! Combined gate result: validation, duplicate search, evolution score, and
//! the exit status they map to.

use std::fmt;

use crate::evolution::EvolutionScore;
use crate::similarity::SimilarityReport;
use crate::validator::{Precheck, ValidationReport};

/// Process exit status of a gate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    Success,
    GeneralError,
    InvalidArguments,
    ResourceNotFound,
    ValidationFailed,
    UserCancelled,
}

impl ExitStatus {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::GeneralError => 1,
            Self::InvalidArguments => 2,
            Self::ResourceNotFound => 3,
            Self::ValidationFailed => 10,
            Self::UserCancelled => 20,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::GeneralError => "general_error",
            Self::InvalidArguments => "invalid_arguments",
            Self::ResourceNotFound => "resource_not_found",
            Self::ValidationFailed => "validation_failed",
            Self::UserCancelled => "user_cancelled",
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

/// A non-fatal finding that needs the operator's consent to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    DuplicatesFound,
    ScoreBelowThreshold,
}

impl Advisory {
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Self::DuplicatesFound => "Similar skills exist. Continue?",
            Self::ScoreBelowThreshold => "Evolution score below threshold. Continue?",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicatesFound => "duplicates_found",
            Self::ScoreBelowThreshold => "score_below_threshold",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub validation: ValidationReport,
    pub similarity: Option<SimilarityReport>,
    pub declined: Option<Advisory>,
    pub strict: bool,
    pub verbose: bool,
}

impl Report {
    #[must_use]
    pub fn new(validation: ValidationReport) -> Self {
        Self {
            validation,
            similarity: None,
            declined: None,
            strict: false,
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_similarity(mut self, similarity: SimilarityReport) -> Self {
        self.similarity = Some(similarity);
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn evolution(&self) -> Option<&EvolutionScore> {
        self.validation.evolution.as_ref()
    }

    /// Whether validation alone ends the run: an error-level outcome, or any
    /// warning under strict mode.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        !self.validation.is_valid() || (self.strict && self.validation.has_warnings())
    }

    /// Findings that require confirmation, in prompt order.
    #[must_use]
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut advisories = Vec::new();
        if self
            .similarity
            .as_ref()
            .is_some_and(SimilarityReport::found_duplicates)
        {
            advisories.push(Advisory::DuplicatesFound);
        }
        if self.evolution().is_some_and(|s| !s.meets_threshold()) {
            advisories.push(Advisory::ScoreBelowThreshold);
        }
        advisories
    }

    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        match self.validation.precheck {
            Some(Precheck::DocumentMissing) => return ExitStatus::ResourceNotFound,
            Some(Precheck::DocumentUnreadable) => return ExitStatus::GeneralError,
            Some(Precheck::HeaderInvalid) => return ExitStatus::ValidationFailed,
            None => {}
        }
        if self.is_blocked() {
            ExitStatus::ValidationFailed
        } else if self.declined.is_some() {
            ExitStatus::UserCancelled
        } else {
            ExitStatus::Success
        }
    }

    /// One-line outcome of the whole run.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![self.validation.summary()];
        if let Some(similarity) = &self.similarity {
            parts.push(format!("{} similar skill(s)", similarity.matches.len()));
        }
        if let Some(score) = self.evolution() {
            parts.push(format!("evolution {}/{}", score.total(), score.max_total()));
        }
        let status = match self.exit_status() {
            ExitStatus::Success => "ready to package".to_owned(),
            other => other.to_string(),
        };
        match self.declined {
            Some(advisory) => format!(
                "Result: {status} ({}; declined: {})",
                parts.join("; "),
                advisory.prompt()
            ),
            None => format!("Result: {status} ({})", parts.join("; ")),
        }
    }

    #[must_use]
    pub fn format_report(&self) -> String {
        let mut sections = vec![format!(
            "Validating {}\n\n{}",
            self.validation.skill_dir.display(),
            self.validation.format_report(self.verbose)
        )];
        if let Some(similarity) = &self.similarity {
            sections.push(similarity.format_report());
        }
        if let Some(score) = self.evolution() {
            sections.push(score.format_report());
        }
        sections.push(self.summary());
        sections.join("\n\n")
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let status = self.exit_status();
        serde_json::json!({
            "skill": self.validation.skill_dir.display().to_string(),
            "validation": self.validation.to_json(),
            "similarity": self.similarity.as_ref().map(SimilarityReport::to_json),
            "evolution": self.evolution().map(EvolutionScore::to_json),
            "declined": self.declined.map(Advisory::as_str),
            "status": status.as_str(),
            "exit_code": status.code(),
        })
    }
}
