//! Agent discovery and parsing.
//!
//! Agents live in a single directory, one `<id>.agent.md` file per agent.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::definitions::{
    self, LoadError, LoadResult, field, optional_string, required_name, scalar_string,
};

/// Default agents directory relative to the workspace root.
pub const DEFAULT_AGENTS_DIR: &str = ".github/agents";

/// File extension for agent definition files.
pub const AGENT_FILE_EXTENSION: &str = ".agent.md";

/// Scripted transfer of control to another agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub label: String,
    pub agent: String,
    pub prompt: String,
    pub send: Option<bool>,
}

/// Agent metadata parsed from YAML frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentFrontmatter {
    pub name: String,
    pub description: Option<String>,
    pub model: Option<String>,
    pub tools: Option<Vec<String>>,
    /// Whether the agent may be invoked autonomously as a sub-agent.
    pub infer: Option<bool>,
    pub handoffs: Option<Vec<Handoff>>,
}

/// Fully parsed agent definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefinition {
    /// Derived from the file name (`developer.agent.md` -> `developer`).
    pub id: String,
    pub frontmatter: AgentFrontmatter,
    pub body: String,
    pub source_path: PathBuf,
}

pub type AgentLoadResult = LoadResult<AgentDefinition>;

/// Loads every agent definition in `dir`.
pub fn load_agents(dir: &Path) -> AgentLoadResult {
    if !dir.is_dir() {
        return LoadResult::directory_error(
            dir,
            format!("Agents directory not found: {}", dir.display()),
        );
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            return LoadResult::directory_error(
                dir,
                format!("Failed to read agents directory: {e}"),
            );
        }
    };

    let mut result = AgentLoadResult::default();
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if is_agent_file(&path) {
                    files.push(path);
                }
            }
            Err(e) => result.errors.push(LoadError::new(
                dir,
                format!("Failed to read agents directory entry: {e}"),
            )),
        }
    }

    if files.is_empty() {
        return LoadResult::directory_error(
            dir,
            format!("No {AGENT_FILE_EXTENSION} files found in {}", dir.display()),
        );
    }

    files.sort();
    for path in files {
        match load_agent(&path) {
            Ok(agent) => result.items.push(agent),
            Err(error) => {
                tracing::debug!(path = %error.file_path.display(), "{}", error.message);
                result.errors.push(error);
            }
        }
    }

    tracing::debug!(
        dir = %dir.display(),
        agents = result.items.len(),
        errors = result.errors.len(),
        "loaded agents"
    );
    result
}

/// Loads a single agent definition file.
///
/// # Errors
/// Returns a `LoadError` if the file cannot be read or fails validation.
pub fn load_agent(path: &Path) -> Result<AgentDefinition, LoadError> {
    let raw = definitions::read_definition(path)
        .map_err(|message| LoadError::new(path, format!("Failed to parse agent file: {message}")))?;

    let frontmatter =
        parse_frontmatter(&raw.frontmatter).map_err(|message| LoadError::new(path, message))?;

    Ok(AgentDefinition {
        id: agent_id(path),
        frontmatter,
        body: raw.body,
        source_path: path.to_path_buf(),
    })
}

/// Finds an agent by id, ignoring case.
pub fn get_agent_by_id<'a>(result: &'a AgentLoadResult, id: &str) -> Option<&'a AgentDefinition> {
    result
        .items
        .iter()
        .find(|agent| definitions::same_id(&agent.id, id))
}

/// Agents eligible to run as autonomous sub-agents (`infer: true`).
pub fn inferable_agents(result: &AgentLoadResult) -> Vec<&AgentDefinition> {
    result
        .items
        .iter()
        .filter(|agent| agent.frontmatter.infer == Some(true))
        .collect()
}

fn is_agent_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(AGENT_FILE_EXTENSION))
}

fn agent_id(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    name.strip_suffix(AGENT_FILE_EXTENSION)
        .unwrap_or(name)
        .to_string()
}

fn parse_frontmatter(data: &Mapping) -> Result<AgentFrontmatter, String> {
    let name = required_name(data)?;

    let handoffs = match field(data, "handoffs") {
        None => None,
        Some(Value::Sequence(items)) => Some(parse_handoffs(items)?),
        Some(_) => return Err("'handoffs' must be an array".to_string()),
    };

    let tools = match field(data, "tools") {
        None => None,
        Some(Value::Sequence(items)) => Some(items.iter().filter_map(scalar_string).collect()),
        Some(_) => return Err("'tools' must be an array".to_string()),
    };

    let infer = match field(data, "infer") {
        Some(Value::Bool(infer)) => Some(*infer),
        _ => None,
    };

    Ok(AgentFrontmatter {
        name,
        description: optional_string(data, "description"),
        model: optional_string(data, "model"),
        tools,
        infer,
        handoffs,
    })
}

fn parse_handoffs(items: &[Value]) -> Result<Vec<Handoff>, String> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let missing =
                || format!("Handoff at index {index} missing required fields (label, agent, prompt)");
            let Value::Mapping(mapping) = item else {
                return Err(missing());
            };
            let (Some(label), Some(agent), Some(prompt)) = (
                optional_string(mapping, "label"),
                optional_string(mapping, "agent"),
                optional_string(mapping, "prompt"),
            ) else {
                return Err(missing());
            };
            let send = match field(mapping, "send") {
                Some(Value::Bool(send)) => Some(*send),
                _ => None,
            };
            Ok(Handoff {
                label,
                agent,
                prompt,
                send,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn write_agent(dir: &Path, id: &str, content: &str) -> PathBuf {
        let path = dir.join(format!("{id}{AGENT_FILE_EXTENSION}"));
        fs::write(&path, content).unwrap();
        path
    }

    const BETH: &str = "```chatagent
---
name: Beth
description: Orchestrates the team
model: Claude Opus 4.5
infer: true
tools:
  - readFile
  - runSubagent
handoffs:
  - label: Build It
    agent: developer
    prompt: Implement the plan
    send: false
  - label: Test It
    agent: tester
    prompt: Test the feature
---

# Beth

You run the show.
```
";

    #[test]
    fn test_full_agent_parses() {
        let dir = tempdir().unwrap();
        write_agent(dir.path(), "beth", BETH);

        let result = load_agents(dir.path());

        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.items.len(), 1);
        let agent = &result.items[0];
        assert_eq!(agent.id, "beth");
        assert_eq!(agent.frontmatter.name, "Beth");
        assert_eq!(
            agent.frontmatter.description.as_deref(),
            Some("Orchestrates the team")
        );
        assert_eq!(agent.frontmatter.model.as_deref(), Some("Claude Opus 4.5"));
        assert_eq!(agent.frontmatter.infer, Some(true));
        assert_eq!(
            agent.frontmatter.tools.as_deref(),
            Some(&["readFile".to_string(), "runSubagent".to_string()][..])
        );
        let handoffs = agent.frontmatter.handoffs.as_ref().unwrap();
        assert_eq!(handoffs.len(), 2);
        assert_eq!(handoffs[0].agent, "developer");
        assert_eq!(handoffs[0].send, Some(false));
        assert_eq!(handoffs[1].send, None);
        assert_eq!(agent.body, "# Beth\n\nYou run the show.");
        assert!(agent.source_path.ends_with("beth.agent.md"));
    }

    #[test]
    fn test_partial_success_counts() {
        let dir = tempdir().unwrap();
        write_agent(dir.path(), "one", "---\nname: one\n---\n");
        write_agent(dir.path(), "two", "---\nname: two\n---\n");
        write_agent(dir.path(), "nameless", "---\ndescription: no name\n---\n");
        write_agent(dir.path(), "bad-tools", "---\nname: x\ntools: readFile\n---\n");
        write_agent(
            dir.path(),
            "bad-handoff",
            "---\nname: x\nhandoffs:\n  - label: L\n    agent: a\n---\n",
        );
        fs::write(dir.path().join("notes.md"), "---\nname: ignored\n---\n").unwrap();

        let result = load_agents(dir.path());

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.errors.len(), 3);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("'tools' must be an array"))
        );
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("Handoff at index 0"))
        );
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("Missing or invalid 'name'"))
        );
    }

    #[test]
    fn test_handoffs_must_be_array() {
        let dir = tempdir().unwrap();
        write_agent(dir.path(), "x", "---\nname: x\nhandoffs: tester\n---\n");

        let result = load_agents(dir.path());

        assert!(result.items.is_empty());
        assert!(result.errors[0].message.contains("'handoffs' must be an array"));
    }

    #[test]
    fn test_missing_directory_single_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = load_agents(&missing);

        assert!(result.items.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("not found"));
    }

    #[test]
    fn test_empty_directory_single_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "hi").unwrap();

        let result = load_agents(dir.path());

        assert!(result.items.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("No .agent.md files"));
    }

    #[test]
    fn test_get_by_id_case_insensitive() {
        let dir = tempdir().unwrap();
        write_agent(dir.path(), "beth", BETH);
        let result = load_agents(dir.path());

        let lower = get_agent_by_id(&result, "beth").unwrap();
        let upper = get_agent_by_id(&result, "Beth").unwrap();
        assert_eq!(lower, upper);
        assert!(get_agent_by_id(&result, "nobody").is_none());
    }

    #[test]
    fn test_get_by_id_folds_non_ascii_case() {
        let dir = tempdir().unwrap();
        write_agent(dir.path(), "élan", "---\nname: Élan\n---\nBody\n");
        let result = load_agents(dir.path());

        assert!(get_agent_by_id(&result, "ÉLAN").is_some());
    }

    #[test]
    fn test_inferable_filters_on_true_only() {
        let dir = tempdir().unwrap();
        write_agent(dir.path(), "beth", BETH);
        write_agent(dir.path(), "quiet", "---\nname: quiet\ninfer: false\n---\n");
        write_agent(dir.path(), "stringy", "---\nname: s\ninfer: \"true\"\n---\n");

        let result = load_agents(dir.path());
        let ids: Vec<&str> = inferable_agents(&result)
            .iter()
            .map(|a| a.id.as_str())
            .collect();

        assert_eq!(ids, vec!["beth"]);
    }

    #[test]
    fn test_loaded_in_file_name_order() {
        let dir = tempdir().unwrap();
        write_agent(dir.path(), "zeta", "---\nname: zeta\n---\n");
        write_agent(dir.path(), "alpha", "---\nname: alpha\n---\n");

        let result = load_agents(dir.path());
        let ids: Vec<&str> = result.items.iter().map(|a| a.id.as_str()).collect();

        assert_eq!(ids, vec!["alpha", "zeta"]);
    }
}
