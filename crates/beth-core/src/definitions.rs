//! Shared parsing for agent and skill definition files.
//!
//! Both catalogs use the same on-disk format: a YAML frontmatter block
//! delimited by `---` lines followed by a free-form body. Files exported from
//! editor integrations may additionally be wrapped in a code fence such as
//! ```` ```chatagent ```` or ```` ```skill ````.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

/// Tag words recognized after an opening code fence.
const FENCE_TAGS: &[&str] = &["chatagent", "skill"];

static OPENING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    let tags = FENCE_TAGS.join("|");
    Regex::new(&format!(r"^(`{{3,}})({tags})\s*[\r\n]")).expect("valid fence regex")
});

/// Error produced while loading a single definition (or a whole directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub file_path: PathBuf,
    pub message: String,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_path.display(), self.message)
    }
}

/// Result of loading a catalog directory.
///
/// Loading is partial-success: every well-formed file ends up in `items`,
/// every malformed one in `errors`. Callers decide whether "nothing loaded"
/// is fatal by looking at `items`, never by parsing error text.
#[derive(Debug, Clone)]
pub struct LoadResult<T> {
    pub items: Vec<T>,
    pub errors: Vec<LoadError>,
}

impl<T> Default for LoadResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> LoadResult<T> {
    /// Result with no items and a single directory-level error.
    pub(crate) fn directory_error(dir: &Path, message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            errors: vec![LoadError::new(dir, message)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Compares two definition ids the way the catalogs look them up: Unicode
/// lowercase on both sides.
pub fn same_id(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Raw definition split into its frontmatter mapping and trimmed body.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawDefinition {
    pub frontmatter: Mapping,
    pub body: String,
}

/// Reads a definition file and splits it into frontmatter and body.
pub(crate) fn read_definition(path: &Path) -> Result<RawDefinition, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read file: {e}"))?;
    parse_definition(&content)
}

/// Splits definition text into frontmatter and body.
pub(crate) fn parse_definition(content: &str) -> Result<RawDefinition, String> {
    let content = strip_utf8_bom(content);
    let content = strip_code_fence(content);
    split_frontmatter(content)
}

fn strip_utf8_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Removes a wrapping code fence when the content opens with one.
///
/// The closing fence is the last run of backticks with the same length as the
/// opening run. Without a closing run the content is returned untouched.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let Some(captures) = OPENING_FENCE.captures(content) else {
        return content;
    };
    let (Some(opening), Some(fence)) = (captures.get(0), captures.get(1)) else {
        return content;
    };

    let closing = fence.as_str();
    let start = opening.end();
    match content.rfind(closing) {
        Some(end) if end > 0 && end >= start => content[start..end].trim(),
        _ => content,
    }
}

fn split_frontmatter(content: &str) -> Result<RawDefinition, String> {
    let mut lines = content.lines();
    let Some(first) = lines.next() else {
        return Ok(RawDefinition::default());
    };

    if first.trim() != "---" {
        return Ok(RawDefinition {
            frontmatter: Mapping::new(),
            body: content.trim().to_string(),
        });
    }

    let mut yaml_lines = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        let trimmed = line.trim();
        if trimmed == "---" || trimmed == "..." {
            closed = true;
            break;
        }
        yaml_lines.push(line);
    }

    if !closed {
        return Err("Unterminated YAML frontmatter".to_string());
    }

    let yaml = yaml_lines.join("\n");
    let frontmatter = if yaml.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(&yaml)
            .map_err(|e| format!("Failed to parse YAML frontmatter: {e}"))?
        {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => return Err("YAML frontmatter must be a mapping".to_string()),
        }
    };

    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    Ok(RawDefinition { frontmatter, body })
}

/// Looks up a key in a frontmatter mapping, treating `null` as absent.
pub(crate) fn field<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    match mapping.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

/// Renders a scalar YAML value as a string.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Optional scalar field; empty strings count as absent.
pub(crate) fn optional_string(mapping: &Mapping, key: &str) -> Option<String> {
    field(mapping, key)
        .and_then(scalar_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Validates the required `name` field shared by every definition kind.
pub(crate) fn required_name(mapping: &Mapping) -> Result<String, String> {
    match field(mapping, "name") {
        Some(Value::String(name)) if !name.trim().is_empty() => Ok(name.trim().to_string()),
        _ => Err("Missing or invalid 'name' in frontmatter".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_id_folds_unicode_case() {
        assert!(same_id("Ærø-agent", "ærø-AGENT"));
        assert!(same_id("ÉCLAIR", "éclair"));
        assert!(!same_id("atlas", "atlas2"));
    }

    #[test]
    fn test_plain_frontmatter_split() {
        let raw = parse_definition("---\nname: beth\n---\n\n# Body\n").unwrap();
        assert_eq!(required_name(&raw.frontmatter).unwrap(), "beth");
        assert_eq!(raw.body, "# Body");
    }

    #[test]
    fn test_fence_stripped_with_last_closing_run() {
        let content = "```chatagent\n---\nname: beth\n---\nUse ```code``` inline.\n```\n";
        let raw = parse_definition(content).unwrap();
        assert_eq!(required_name(&raw.frontmatter).unwrap(), "beth");
        assert_eq!(raw.body, "Use ```code``` inline.");
    }

    #[test]
    fn test_longer_fence_keeps_inner_fences() {
        let content = "````skill\n---\nname: prd\n---\n```md\nexample\n```\n````";
        let raw = parse_definition(content).unwrap();
        assert_eq!(raw.body, "```md\nexample\n```");
    }

    #[test]
    fn test_unclosed_fence_left_untouched() {
        let content = "````skill\n---\nname: prd\n---\n";
        assert_eq!(strip_code_fence(content), content);
    }

    #[test]
    fn test_unknown_fence_tag_left_untouched() {
        let content = "```yaml\n---\nname: x\n---\n```";
        assert_eq!(strip_code_fence(content), content);
    }

    #[test]
    fn test_missing_frontmatter_is_empty_mapping() {
        let raw = parse_definition("# Just a body\n").unwrap();
        assert!(raw.frontmatter.is_empty());
        assert_eq!(raw.body, "# Just a body");
        assert!(required_name(&raw.frontmatter).is_err());
    }

    #[test]
    fn test_unterminated_frontmatter_errors() {
        let err = parse_definition("---\nname: beth\n").unwrap_err();
        assert!(err.contains("Unterminated"));
    }

    #[test]
    fn test_invalid_yaml_errors() {
        let err = parse_definition("---\nname: [unclosed\n---\n").unwrap_err();
        assert!(err.contains("Failed to parse YAML"));
    }

    #[test]
    fn test_non_string_name_rejected() {
        let raw = parse_definition("---\nname: 42\n---\n").unwrap();
        assert!(required_name(&raw.frontmatter).is_err());
    }

    #[test]
    fn test_utf8_bom_handled() {
        let raw = parse_definition("\u{feff}---\nname: bom\n---\n").unwrap();
        assert_eq!(required_name(&raw.frontmatter).unwrap(), "bom");
    }
}
