//! Syntax checks for scripts bundled under `<skill>/scripts/`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SkillError;

pub const SCRIPTS_DIR: &str = "scripts";

/// Script language with a tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptLang {
    Python,
    Bash,
    JavaScript,
}

impl ScriptLang {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Bash => "bash",
            Self::JavaScript => "javascript",
        }
    }

    /// The compiled-in grammar, or `None` when the language feature is off.
    #[must_use]
    pub fn grammar(self) -> Option<tree_sitter::Language> {
        match self {
            #[cfg(feature = "lang-python")]
            Self::Python => Some(tree_sitter_python::LANGUAGE.into()),
            #[cfg(feature = "lang-bash")]
            Self::Bash => Some(tree_sitter_bash::LANGUAGE.into()),
            #[cfg(feature = "lang-js")]
            Self::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for ScriptLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[must_use]
pub fn detect_language(path: &Path) -> Option<ScriptLang> {
    match path.extension()?.to_str()? {
        "py" => Some(ScriptLang::Python),
        "sh" | "bash" => Some(ScriptLang::Bash),
        "js" | "mjs" | "cjs" => Some(ScriptLang::JavaScript),
        _ => None,
    }
}

/// One problem found in a bundled script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptIssue {
    pub file: String,
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for ScriptIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: line {line}: {}", self.file, self.message),
            None => write!(f, "{}: {}", self.file, self.message),
        }
    }
}

/// Script files directly inside `<skill_dir>/scripts/` whose language has a
/// grammar, sorted by path.
#[must_use]
pub fn discover_scripts(skill_dir: &Path) -> Vec<(PathBuf, ScriptLang)> {
    let Ok(entries) = std::fs::read_dir(skill_dir.join(SCRIPTS_DIR)) else {
        return Vec::new();
    };
    let mut scripts: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let lang = detect_language(&path)?;
            lang.grammar().is_some().then_some((path, lang))
        })
        .collect();
    scripts.sort_by(|a, b| a.0.cmp(&b.0));
    scripts
}

/// Parse `source` and return the first syntax problem as `(line, message)`.
///
/// # Errors
///
/// Returns [`SkillError::Grammar`] if the grammar is unavailable or rejected by
/// the tree-sitter runtime.
pub fn check_source(source: &str, lang: ScriptLang) -> Result<Option<(usize, String)>, SkillError> {
    let grammar = lang
        .grammar()
        .ok_or_else(|| SkillError::Grammar(format!("{lang} support not compiled in")))?;
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| SkillError::Grammar(e.to_string()))?;
    let Some(tree) = parser.parse(source, None) else {
        return Err(SkillError::Grammar(format!("{lang} parser produced no tree")));
    };

    let root = tree.root_node();
    if root.has_error() {
        return Ok(first_error(root).map(|node| {
            let message = if node.is_missing() {
                format!("missing '{}'", node.kind())
            } else {
                "invalid syntax".to_owned()
            };
            (node.start_position().row + 1, message)
        }));
    }
    if lang == ScriptLang::Python {
        return Ok(first_python2_statement(root, source).map(|(node, keyword)| {
            (
                node.start_position().row + 1,
                format!("Python 2 '{keyword}' statement"),
            )
        }));
    }
    Ok(None)
}

/// The Python grammar still accepts `print x` and `exec code`. The call forms
/// `print(x)` and `print (x)` are valid Python 3 and are left alone.
fn first_python2_statement<'t>(
    node: tree_sitter::Node<'t>,
    source: &str,
) -> Option<(tree_sitter::Node<'t>, &'static str)> {
    let keyword = match node.kind() {
        "print_statement" => Some("print"),
        "exec_statement" => Some("exec"),
        _ => None,
    };
    if let Some(keyword) = keyword {
        let text = node.utf8_text(source.as_bytes()).unwrap_or_default();
        let rest = text.strip_prefix(keyword).unwrap_or(text).trim_start();
        if !rest.starts_with('(') {
            return Some((node, keyword));
        }
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find_map(|child| first_python2_statement(child, source))
}

fn first_error(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Check every discovered script. Unreadable files are reported alongside
/// syntax errors rather than aborting the run.
#[must_use]
pub fn check_scripts(skill_dir: &Path) -> Vec<ScriptIssue> {
    let mut issues = Vec::new();
    for (path, lang) in discover_scripts(skill_dir) {
        let file = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                issues.push(ScriptIssue {
                    file,
                    line: None,
                    message: format!("unreadable: {e}"),
                });
                continue;
            }
        };
        match check_source(&source, lang) {
            Ok(None) => tracing::debug!(script = %path.display(), %lang, "script parses"),
            Ok(Some((line, message))) => issues.push(ScriptIssue {
                file,
                line: Some(line),
                message,
            }),
            Err(e) => issues.push(ScriptIssue {
                file,
                line: None,
                message: e.to_string(),
            }),
        }
    }
    issues
}
