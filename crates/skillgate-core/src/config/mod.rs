mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

/// Project-local skill directory, relative to the working directory.
pub const PROJECT_SKILLS_DIR: &str = ".claude/skills";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the similarity threshold lies outside `[0, 1]`.
    pub fn validate(&self) -> anyhow::Result<()> {
        let threshold = self.similarity.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            bail!("similarity.threshold must be between 0 and 1, got {threshold}");
        }
        Ok(())
    }

    /// Configured search roots with `~` expanded, plus the project directory
    /// under `cwd` when enabled and present.
    #[must_use]
    pub fn skill_roots(&self, cwd: &Path) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.skills.paths.iter().map(|p| expand_home(p)).collect();
        if self.skills.include_project {
            let project = cwd.join(PROJECT_SKILLS_DIR);
            if project.is_dir() && !roots.contains(&project) {
                roots.push(project);
            }
        }
        roots
    }
}

/// Replace a leading `~` with the home directory. Paths are returned
/// unchanged when no home directory is known.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
