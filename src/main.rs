mod cli;
mod prompt;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use skillgate_core::config::Config;
use skillgate_core::gate::{Gate, find_duplicates};
use skillgate_skills::evolution;
use skillgate_skills::frontmatter::default_parser;
use skillgate_skills::loader::SkillPaths;
use skillgate_skills::report::{ExitStatus, Report};
use skillgate_skills::validator::StructuralValidator;

use crate::cli::{Cli, Commands};
use crate::prompt::TerminalConfirm;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_subscriber();

    match run(cli) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitStatus::GeneralError.into()
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitStatus> {
    let config_path = resolve_config_path(cli.config);
    let mut config = Config::load(&config_path)?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    match cli.command {
        Commands::Validate {
            path,
            verbose,
            strict,
            json,
        } => {
            config.validation.verbose |= verbose;
            config.validation.strict |= strict;
            validate(&config, &path, json)
        }
        Commands::Duplicates {
            name,
            description,
            threshold,
            exclude,
            roots,
            json,
        } => {
            if let Some(threshold) = threshold {
                config.similarity.threshold = threshold;
            }
            if let Err(e) = config.validate() {
                eprintln!("Error: {e:#}");
                return Ok(ExitStatus::InvalidArguments);
            }
            let roots = match search_roots(&config, roots)? {
                Ok(roots) => roots,
                Err(status) => return Ok(status),
            };
            let report = find_duplicates(
                &roots,
                default_parser(),
                config.similarity.threshold,
                &name,
                &description,
                exclude.as_deref(),
            );
            if json {
                print_json(&report.to_json())?;
            } else {
                println!("{}", report.format_report());
            }
            Ok(ExitStatus::Success)
        }
        Commands::Score { path, json, quiet } => score(&path, json, quiet),
        Commands::Check {
            path,
            yes,
            strict,
            roots,
            json,
        } => {
            config.gate.assume_yes |= yes;
            config.validation.strict |= strict;
            if let Err(e) = config.validate() {
                eprintln!("Error: {e:#}");
                return Ok(ExitStatus::InvalidArguments);
            }
            let roots = match search_roots(&config, roots)? {
                Ok(roots) => roots,
                Err(status) => return Ok(status),
            };
            let report = Gate::new(&config, roots).run(&path, &mut TerminalConfirm);
            if json {
                print_json(&report.to_json())?;
            } else {
                println!("{}", report.format_report());
            }
            Ok(report.exit_status())
        }
    }
}

fn validate(config: &Config, path: &Path, json: bool) -> anyhow::Result<ExitStatus> {
    let report = Report::new(StructuralValidator::default().validate(path))
        .strict(config.validation.strict)
        .verbose(config.validation.verbose);
    if json {
        print_json(&report.validation.to_json())?;
    } else {
        println!("{}", report.validation.format_report(report.verbose));
    }
    Ok(report.exit_status())
}

fn score(path: &Path, json: bool, quiet: bool) -> anyhow::Result<ExitStatus> {
    let paths = SkillPaths::locate(path);
    if !paths.document.is_file() {
        eprintln!("Error: SKILL.md not found at {}", paths.document.display());
        return Ok(ExitStatus::ResourceNotFound);
    }
    let content = std::fs::read_to_string(&paths.document)
        .with_context(|| format!("failed to read {}", paths.document.display()))?;
    let score = evolution::score(&content);

    if quiet {
        println!("{}", score.total());
    } else if json {
        print_json(&score.to_json())?;
    } else {
        println!("{}", score.format_report());
    }
    Ok(ExitStatus::Success)
}

/// Explicit roots must all exist; otherwise fall back to the configured ones.
fn search_roots(
    config: &Config,
    explicit: Vec<PathBuf>,
) -> anyhow::Result<Result<Vec<PathBuf>, ExitStatus>> {
    if explicit.is_empty() {
        let cwd = std::env::current_dir().context("failed to read working directory")?;
        return Ok(Ok(config.skill_roots(&cwd)));
    }
    if let Some(missing) = explicit.iter().find(|root| !root.is_dir()) {
        eprintln!("Error: search root not found: {}", missing.display());
        return Ok(Err(ExitStatus::ResourceNotFound));
    }
    Ok(Ok(explicit))
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Ok(path) = std::env::var("SKILLGATE_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
