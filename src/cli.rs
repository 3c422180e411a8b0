//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Quality gate for SKILL.md skill documents.
#[derive(Parser)]
#[command(name = "skillgate", version, about)]
pub struct Cli {
    /// Configuration file (overrides SKILLGATE_CONFIG).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the structural and content checks on one skill.
    Validate {
        /// Skill directory or its SKILL.md.
        path: PathBuf,

        /// List evolution suggestions when the score is below threshold.
        #[arg(long, short)]
        verbose: bool,

        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,

        #[arg(long)]
        json: bool,
    },

    /// Search the skill corpus for near-duplicates of a proposed skill.
    Duplicates {
        name: String,
        description: String,

        /// Minimum combined similarity, 0.0 to 1.0.
        #[arg(long)]
        threshold: Option<f64>,

        /// Skill directory to leave out of the comparison.
        #[arg(long)]
        exclude: Option<PathBuf>,

        /// Search root; replaces the configured roots. Repeatable.
        #[arg(long = "root")]
        roots: Vec<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Compute the evolution score of one skill.
    Score {
        /// Skill directory or its SKILL.md.
        path: PathBuf,

        #[arg(long, conflicts_with = "quiet")]
        json: bool,

        /// Print only the numeric score.
        #[arg(long, short)]
        quiet: bool,
    },

    /// Pre-flight gate: validate, look for duplicates, score, and confirm.
    Check {
        /// Skill directory or its SKILL.md.
        path: PathBuf,

        /// Continue past advisories without prompting.
        #[arg(long, short)]
        yes: bool,

        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,

        /// Search root; replaces the configured roots. Repeatable.
        #[arg(long = "root")]
        roots: Vec<PathBuf>,

        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_check_with_roots() {
        let cli = Cli::try_parse_from([
            "skillgate", "check", "skills/pdf", "--yes", "--root", "/a", "--root", "/b",
        ])
        .unwrap();
        let Commands::Check { path, yes, roots, .. } = cli.command else {
            panic!("expected check");
        };
        assert_eq!(path, PathBuf::from("skills/pdf"));
        assert!(yes);
        assert_eq!(roots, [PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn score_json_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["skillgate", "score", "x", "--json", "--quiet"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["skillgate", "validate", "x", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
