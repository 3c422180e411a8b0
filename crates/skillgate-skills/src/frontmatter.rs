//! Header extraction for skill documents.
//!
//! A skill document opens with a `---` fenced block of `key: value` pairs
//! followed by a markdown body. Two parsing strategies implement
//! [`HeaderParser`]: a YAML parser (behind the `yaml` feature) and a
//! line-oriented fallback. [`default_parser`] picks one at build time so call
//! sites never branch on which is available.

use std::borrow::Cow;

use crate::error::SkillError;

pub const DELIMITER: &str = "---";

/// Ordered, flat key/value header. Insertion order is preserved; re-inserting
/// a key overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    entries: Vec<(String, String)>,
}

impl Header {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Header {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut header = Self::default();
        for (k, v) in iter {
            header.insert(k, v);
        }
        header
    }
}

/// A capability that turns the raw text between the header delimiters into a
/// flat [`Header`].
pub trait HeaderParser: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns [`SkillError::InvalidHeader`] if the block is not key/value shaped.
    fn parse(&self, block: &str) -> Result<Header, SkillError>;
}

/// Treats every non-indented `key: value` line as a scalar entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineHeaderParser;

impl HeaderParser for LineHeaderParser {
    fn name(&self) -> &'static str {
        "line"
    }

    fn parse(&self, block: &str) -> Result<Header, SkillError> {
        let mut header = Header::default();
        for line in block.split('\n') {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if line.starts_with([' ', '\t']) {
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                header.insert(key.trim(), value.trim().trim_matches(['"', '\'']));
            }
        }
        Ok(header)
    }
}

/// Full YAML parsing. Scalars are stringified, nested values keep their
/// compact JSON rendering.
#[cfg(feature = "yaml")]
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlHeaderParser;

#[cfg(feature = "yaml")]
impl HeaderParser for YamlHeaderParser {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, block: &str) -> Result<Header, SkillError> {
        let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(block)
            .map_err(|e| SkillError::InvalidHeader(e.to_string()))?;
        let serde_yaml_ng::Value::Mapping(map) = value else {
            return Err(SkillError::InvalidHeader(
                "header must be a key/value mapping".into(),
            ));
        };
        Ok(map
            .iter()
            .map(|(k, v)| (yaml_text(k), yaml_text(v)))
            .collect())
    }
}

#[cfg(feature = "yaml")]
fn yaml_text(value: &serde_yaml_ng::Value) -> String {
    use serde_yaml_ng::Value;

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => yaml_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value)
            .or_else(|_| serde_yaml_ng::to_string(value).map(|s| s.trim_end().to_owned()))
            .unwrap_or_default(),
    }
}

/// The parser selected for this build: YAML when compiled in, otherwise the
/// line-oriented fallback.
#[must_use]
pub fn default_parser() -> &'static dyn HeaderParser {
    #[cfg(feature = "yaml")]
    {
        &YamlHeaderParser
    }
    #[cfg(not(feature = "yaml"))]
    {
        &LineHeaderParser
    }
}

/// Parsed skill document.
#[derive(Debug, Clone)]
pub struct Document {
    pub header: Header,
    pub body: String,
}

/// Split normalized text into `(header_block, body)`.
///
/// # Errors
///
/// [`SkillError::MissingHeader`] if the text does not start with `---`,
/// [`SkillError::InvalidHeader`] if no closing delimiter follows.
pub fn split_header(content: &str) -> Result<(&str, &str), SkillError> {
    if !content.starts_with(DELIMITER) {
        return Err(SkillError::MissingHeader);
    }
    let invalid = || SkillError::InvalidHeader("invalid header format".into());
    let rest = content.strip_prefix("---\n").ok_or_else(invalid)?;
    let close = rest.find("\n---").ok_or_else(invalid)?;
    Ok((&rest[..close], &rest[close + 4..]))
}

/// Extract and parse the header of `content`, returning header and body.
///
/// # Errors
///
/// Propagates [`split_header`] failures and the parser's
/// [`SkillError::InvalidHeader`].
pub fn parse_document(content: &str, parser: &dyn HeaderParser) -> Result<Document, SkillError> {
    let content = normalize_newlines(content);
    let (block, body) = split_header(&content)?;
    let header = parser.parse(block)?;
    tracing::debug!(parser = parser.name(), keys = header.len(), "parsed header");
    Ok(Document {
        header,
        body: body.to_owned(),
    })
}

pub(crate) fn normalize_newlines(content: &str) -> Cow<'_, str> {
    if content.contains('\r') {
        Cow::Owned(content.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "---\nname: pdf-filler\ndescription: Fills PDF forms\n---\n# PDF Filler\n";

    #[test]
    fn splits_header_and_body() {
        let (block, body) = split_header(SIMPLE).unwrap();
        assert_eq!(block, "name: pdf-filler\ndescription: Fills PDF forms");
        assert_eq!(body, "\n# PDF Filler\n");
    }

    #[test]
    fn missing_opening_delimiter() {
        let err = parse_document("# No header\nbody", default_parser()).unwrap_err();
        assert!(matches!(err, SkillError::MissingHeader));
        assert!(err.is_header_error());
    }

    #[test]
    fn unclosed_header_is_invalid() {
        let err = parse_document("---\nname: x\n", default_parser()).unwrap_err();
        assert!(matches!(err, SkillError::InvalidHeader(_)));
    }

    #[test]
    fn opening_line_must_be_exact() {
        let err = split_header("----\nname: x\n---\n").unwrap_err();
        assert!(matches!(err, SkillError::InvalidHeader(_)));
    }

    #[test]
    fn crlf_is_normalized() {
        let doc = parse_document(
            "---\r\nname: x\r\ndescription: y\r\n---\r\nbody",
            &LineHeaderParser,
        )
        .unwrap();
        assert_eq!(doc.header.get("name"), Some("x"));
        assert_eq!(doc.body, "\nbody");
    }

    #[test]
    fn line_parser_skips_comments_and_indented_lines() {
        let header = LineHeaderParser
            .parse("# comment\nname: 'quoted'\n\nmetadata:\n  owner: me\ndescription: \"d: with colon\"")
            .unwrap();
        let keys: Vec<_> = header.keys().collect();
        assert_eq!(keys, ["name", "metadata", "description"]);
        assert_eq!(header.get("name"), Some("quoted"));
        assert_eq!(header.get("metadata"), Some(""));
        assert_eq!(header.get("description"), Some("d: with colon"));
    }

    #[test]
    fn line_parser_last_duplicate_wins_in_place() {
        let header = LineHeaderParser.parse("name: a\nlicense: MIT\nname: b").unwrap();
        let pairs: Vec<_> = header.iter().collect();
        assert_eq!(pairs, [("name", "b"), ("license", "MIT")]);
    }

    #[test]
    fn header_insert_and_lookup() {
        let header: Header = [("name", "x"), ("description", "y")].into_iter().collect();
        assert_eq!(header.len(), 2);
        assert!(header.contains_key("description"));
        assert!(!header.contains_key("license"));
        assert!(!header.is_empty());
    }

    #[cfg(feature = "yaml")]
    mod yaml {
        use super::*;

        #[test]
        fn strategies_agree_on_simple_scalars() {
            let block = "name: pdf-filler\ndescription: \"Fills PDF forms\"\nlicense: MIT";
            let yaml = YamlHeaderParser.parse(block).unwrap();
            let line = LineHeaderParser.parse(block).unwrap();
            assert_eq!(yaml, line);
        }

        #[test]
        fn non_mapping_is_invalid() {
            let err = YamlHeaderParser.parse("- a\n- b").unwrap_err();
            assert!(matches!(err, SkillError::InvalidHeader(_)));
        }

        #[test]
        fn empty_block_is_invalid() {
            let err = parse_document("---\n\n---\nbody", &YamlHeaderParser).unwrap_err();
            assert!(matches!(err, SkillError::InvalidHeader(_)));
        }

        #[test]
        fn malformed_yaml_is_invalid() {
            let err = YamlHeaderParser.parse("name: [unterminated").unwrap_err();
            assert!(matches!(err, SkillError::InvalidHeader(_)));
        }

        #[test]
        fn nested_values_survive_as_json() {
            let header = YamlHeaderParser
                .parse("name: x\nallowed-tools:\n  - Read\n  - Bash\nmetadata:\n  owner: me\nversion: 3")
                .unwrap();
            assert_eq!(header.get("allowed-tools"), Some(r#"["Read","Bash"]"#));
            assert_eq!(header.get("metadata"), Some(r#"{"owner":"me"}"#));
            assert_eq!(header.get("version"), Some("3"));
        }

        #[test]
        fn default_parser_is_yaml() {
            assert_eq!(default_parser().name(), "yaml");
        }
    }
}
