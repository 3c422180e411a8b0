use serde::{Deserialize, Serialize};
use skillgate_skills::similarity::DEFAULT_THRESHOLD;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub skills: SkillsConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub gate: GateConfig,
}

fn default_skill_paths() -> Vec<String> {
    vec!["~/.claude/skills".into(), "~/.claude/commands".into()]
}

fn default_include_project() -> bool {
    true
}

/// Where existing skills are searched for duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SkillsConfig {
    #[serde(default = "default_skill_paths")]
    pub paths: Vec<String>,
    /// Also search `./.claude/skills` when it exists.
    #[serde(default = "default_include_project")]
    pub include_project: bool,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            paths: default_skill_paths(),
            include_project: default_include_project(),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimilarityConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Treat warnings as failures.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GateConfig {
    /// Answer every confirmation prompt with yes.
    #[serde(default)]
    pub assume_yes: bool,
}
