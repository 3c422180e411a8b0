use std::path::PathBuf;

use crate::frontmatter::HeaderParser;
use crate::loader::{SKILL_FILE, SkillDescriptor, load_descriptor};

/// A candidate document the scan could not turn into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCandidate {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one corpus scan. Every `SKILL.md` found ends up in exactly one of
/// `skills` or `skipped`.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub skills: Vec<SkillDescriptor>,
    pub skipped: Vec<SkippedCandidate>,
    pub missing_roots: Vec<PathBuf>,
}

/// Enumerates skill documents beneath a set of search roots.
#[derive(Debug, Clone)]
pub struct SkillRepository {
    roots: Vec<PathBuf>,
}

impl SkillRepository {
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Walk every root recursively for `SKILL.md` files and parse their headers.
    ///
    /// A failure on one candidate is recorded in [`ScanReport::skipped`] and
    /// logged with `tracing::warn`; it never aborts the scan. Roots that do not
    /// exist are listed in [`ScanReport::missing_roots`].
    #[must_use]
    pub fn scan(&self, parser: &dyn HeaderParser) -> ScanReport {
        let mut report = ScanReport::default();

        for root in &self.roots {
            if !root.is_dir() {
                tracing::debug!(root = %root.display(), "skill root does not exist");
                report.missing_roots.push(root.clone());
                continue;
            }

            let walker = ignore::WalkBuilder::new(root)
                .standard_filters(false)
                .follow_links(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = walk_error_path(&e).unwrap_or_else(|| root.clone());
                        skip(&mut report, path, e.to_string());
                        continue;
                    }
                };
                if !entry.file_type().is_some_and(|ft| ft.is_file())
                    || entry.file_name() != SKILL_FILE
                {
                    continue;
                }
                match load_descriptor(entry.path(), parser) {
                    Ok(skill) => report.skills.push(skill),
                    Err(e) => skip(&mut report, entry.into_path(), e.to_string()),
                }
            }
        }

        tracing::info!(
            found = report.skills.len(),
            skipped = report.skipped.len(),
            "skill corpus scanned"
        );
        report
    }
}

fn skip(report: &mut ScanReport, path: PathBuf, reason: String) {
    tracing::warn!(path = %path.display(), %reason, "skipping skill candidate");
    report.skipped.push(SkippedCandidate { path, reason });
}

fn walk_error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        _ => None,
    }
}
