use std::path::{Path, PathBuf};

use crate::error::SkillError;
use crate::frontmatter::{Document, HeaderParser, parse_document};

/// Conventional file name of a skill document inside its directory.
pub const SKILL_FILE: &str = "SKILL.md";

/// Identity of a skill for duplicate detection. `location` is the skill
/// directory; two descriptors refer to the same skill when their resolved
/// locations are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDescriptor {
    pub name: String,
    pub description: String,
    pub location: PathBuf,
}

impl SkillDescriptor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            location: location.into(),
        }
    }

    /// Canonical location, falling back to the stored path when it cannot be
    /// resolved (e.g. an ad hoc descriptor for a skill not yet on disk).
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        resolve(&self.location)
    }

    #[must_use]
    pub fn is_at(&self, location: &Path) -> bool {
        self.resolved_location() == resolve(location)
    }
}

pub(crate) fn resolve(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Directory holding `path`. A bare file name has the empty path as its
/// parent, which is taken as the working directory.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Paths of a skill on disk: its directory and its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillPaths {
    pub dir: PathBuf,
    pub document: PathBuf,
}

impl SkillPaths {
    /// Accepts either a skill directory or the path of its `SKILL.md`.
    #[must_use]
    pub fn locate(path: &Path) -> Self {
        if path.is_file() {
            Self {
                dir: parent_dir(path),
                document: path.to_path_buf(),
            }
        } else {
            Self {
                dir: path.to_path_buf(),
                document: path.join(SKILL_FILE),
            }
        }
    }
}

/// Read and parse a skill document.
///
/// # Errors
///
/// [`SkillError::NotFound`] when the file is absent, [`SkillError::Io`] when it
/// cannot be read, and header errors from [`parse_document`].
pub fn read_document(path: &Path, parser: &dyn HeaderParser) -> Result<(String, Document), SkillError> {
    if !path.is_file() {
        return Err(SkillError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| SkillError::io(path, e))?;
    let document = parse_document(&content, parser)?;
    Ok((content, document))
}

/// Build a descriptor from a `SKILL.md` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, its header is missing or
/// malformed, or the header has no `name`.
pub fn load_descriptor(path: &Path, parser: &dyn HeaderParser) -> Result<SkillDescriptor, SkillError> {
    let (_, document) = read_document(path, parser)?;
    let name = document
        .header
        .get("name")
        .ok_or_else(|| SkillError::InvalidHeader("missing 'name'".into()))?;
    let description = document.header.get("description").unwrap_or_default();
    Ok(SkillDescriptor::new(name, description, parent_dir(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::default_parser;

    fn write_skill(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(SKILL_FILE);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_valid_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_skill(
            dir.path(),
            "---\nname: test\ndescription: A test skill.\n---\n# Body\nHello",
        );

        let skill = load_descriptor(&path, default_parser()).unwrap();
        assert_eq!(skill.name, "test");
        assert_eq!(skill.description, "A test skill.");
        assert!(skill.is_at(dir.path()));
    }

    #[test]
    fn description_defaults_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_skill(dir.path(), "---\nname: test\n---\nbody");

        let skill = load_descriptor(&path, default_parser()).unwrap();
        assert!(skill.description.is_empty());
    }

    #[test]
    fn missing_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_skill(dir.path(), "---\ndescription: nameless\n---\nbody");

        let err = load_descriptor(&path, default_parser()).unwrap_err();
        assert!(err.to_string().contains("missing 'name'"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_descriptor(&dir.path().join(SKILL_FILE), default_parser()).unwrap_err();
        assert!(matches!(err, SkillError::NotFound(_)));
    }

    #[test]
    fn locate_accepts_directory_or_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_skill(dir.path(), "---\nname: x\n---\n");

        let from_dir = SkillPaths::locate(dir.path());
        let from_file = SkillPaths::locate(&path);
        assert_eq!(from_dir, from_file);
        assert_eq!(from_dir.document, path);
    }

    #[test]
    fn bare_file_name_lives_in_working_directory() {
        assert_eq!(parent_dir(Path::new(SKILL_FILE)), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("a/SKILL.md")), PathBuf::from("a"));
        assert_eq!(parent_dir(Path::new("/SKILL.md")), PathBuf::from("/"));
    }

    #[test]
    fn ad_hoc_descriptor_resolves_to_itself() {
        let skill = SkillDescriptor::new("x", "y", "/nonexistent/skill");
        assert_eq!(skill.resolved_location(), PathBuf::from("/nonexistent/skill"));
        assert!(skill.is_at(Path::new("/nonexistent/skill")));
    }
}
