//! Skills discovery, trigger extraction and matching.
//!
//! Skills live one level deep: `<skills_dir>/<id>/SKILL.md`. Each skill's
//! description advertises the phrases that should activate it, either as a
//! `Triggers on: a, b, c.` list or as double-quoted phrases.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::definitions::{self, LoadError, LoadResult, optional_string, required_name};

/// Default skills directory relative to the workspace root.
pub const DEFAULT_SKILLS_DIR: &str = ".github/skills";

/// File name for skill definition files.
pub const SKILL_FILE_NAME: &str = "SKILL.md";

static TRIGGER_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Triggers on|Use when)[:\s]+([^.]+)").expect("valid trigger regex")
});

static QUOTED_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid quoted phrase regex"));

/// Skill metadata parsed from YAML frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillFrontmatter {
    pub name: String,
    pub description: Option<String>,
}

/// Fully parsed skill definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDefinition {
    /// Name of the directory holding the skill file.
    pub id: String,
    pub frontmatter: SkillFrontmatter,
    pub body: String,
    pub source_path: PathBuf,
    /// Lowercase, deduplicated trigger phrases.
    pub triggers: Vec<String>,
}

pub type SkillLoadResult = LoadResult<SkillDefinition>;

/// Include/ignore filters applied to skill ids.
#[derive(Debug, Clone, Default)]
pub struct SkillFilters {
    include: Option<GlobSet>,
    ignore: Option<GlobSet>,
}

impl SkillFilters {
    /// Compiles glob patterns into filters.
    ///
    /// Invalid patterns are reported as errors against `source` and skipped.
    pub fn new(include: &[String], ignore: &[String], source: &Path) -> (Self, Vec<LoadError>) {
        let (include, mut errors) = glob_set(include, source);
        let (ignore, ignore_errors) = glob_set(ignore, source);
        errors.extend(ignore_errors);
        (Self { include, ignore }, errors)
    }

    /// An id passes when no ignore pattern and some include pattern (if any
    /// were given) matches it.
    fn allows(&self, id: &str) -> bool {
        let ignored = self.ignore.as_ref().is_some_and(|set| set.is_match(id));
        let included = self.include.as_ref().is_none_or(|set| set.is_match(id));
        included && !ignored
    }
}

/// Loads every skill under `dir`.
pub fn load_skills(dir: &Path) -> SkillLoadResult {
    load_skills_with_filters(dir, &SkillFilters::default())
}

/// Loads skills under `dir`, skipping ids rejected by `filters`.
pub fn load_skills_with_filters(dir: &Path, filters: &SkillFilters) -> SkillLoadResult {
    if !dir.is_dir() {
        return LoadResult::directory_error(
            dir,
            format!("Skills directory not found: {}", dir.display()),
        );
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            return LoadResult::directory_error(
                dir,
                format!("Failed to read skills directory: {e}"),
            );
        }
    };

    let mut skill_dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    if skill_dirs.is_empty() {
        return LoadResult::directory_error(
            dir,
            format!("No skill directories found in {}", dir.display()),
        );
    }

    skill_dirs.sort();
    let mut result = SkillLoadResult::default();
    for skill_dir in skill_dirs {
        let Some(id) = skill_dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !filters.allows(id) {
            tracing::debug!(skill = id, "skill filtered out");
            continue;
        }

        let skill_path = skill_dir.join(SKILL_FILE_NAME);
        let loaded = if skill_path.is_file() {
            load_skill(&skill_path, Some(id))
        } else {
            Err(LoadError::new(
                &skill_dir,
                format!("Missing {SKILL_FILE_NAME} in skill directory: {id}"),
            ))
        };

        match loaded {
            Ok(skill) => result.items.push(skill),
            Err(error) => {
                tracing::debug!(path = %error.file_path.display(), "{}", error.message);
                result.errors.push(error);
            }
        }
    }

    tracing::debug!(
        dir = %dir.display(),
        skills = result.items.len(),
        errors = result.errors.len(),
        "loaded skills"
    );
    result
}

/// Loads a single skill file.
///
/// Without an explicit `id`, the name of the containing directory is used.
///
/// # Errors
/// Returns a `LoadError` if the file cannot be read or fails validation.
pub fn load_skill(path: &Path, id: Option<&str>) -> Result<SkillDefinition, LoadError> {
    let raw = definitions::read_definition(path)
        .map_err(|message| LoadError::new(path, format!("Failed to parse skill file: {message}")))?;

    let name = required_name(&raw.frontmatter).map_err(|message| LoadError::new(path, message))?;
    let description = optional_string(&raw.frontmatter, "description");
    let triggers = extract_triggers(description.as_deref());

    let id = id.map_or_else(
        || {
            path.parent()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string()
        },
        str::to_string,
    );

    Ok(SkillDefinition {
        id,
        frontmatter: SkillFrontmatter { name, description },
        body: raw.body,
        source_path: path.to_path_buf(),
        triggers,
    })
}

/// Finds a skill by id, ignoring case.
pub fn get_skill_by_id<'a>(result: &'a SkillLoadResult, id: &str) -> Option<&'a SkillDefinition> {
    result
        .items
        .iter()
        .find(|skill| definitions::same_id(&skill.id, id))
}

/// Extracts trigger phrases from a skill description.
///
/// Recognizes `Triggers on: a, b, c` / `Use when: a, b` lists (up to the next
/// period) and every double-quoted phrase. Results are lowercase and keep
/// first-seen order.
pub fn extract_triggers(description: Option<&str>) -> Vec<String> {
    let Some(description) = description else {
        return Vec::new();
    };

    let listed = TRIGGER_LIST
        .captures(description)
        .and_then(|captures| captures.get(1))
        .map(|list| {
            list.as_str()
                .split(',')
                .map(|phrase| phrase.trim().to_lowercase())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let quoted = QUOTED_PHRASE
        .captures_iter(description)
        .filter_map(|captures| captures.get(1))
        .map(|phrase| phrase.as_str().to_lowercase());

    let mut seen = HashSet::new();
    listed
        .into_iter()
        .chain(quoted)
        .filter(|phrase| !phrase.is_empty())
        .filter(|phrase| seen.insert(phrase.clone()))
        .collect()
}

/// Lookup from lowercase trigger phrase to the skill it activates.
///
/// When two skills register the same phrase the later one wins. Iteration
/// follows the order in which phrases were first registered.
#[derive(Debug, Clone, Default)]
pub struct TriggerMap {
    phrases: Vec<String>,
    skills: HashMap<String, SkillDefinition>,
}

impl TriggerMap {
    pub fn insert(&mut self, phrase: &str, skill: SkillDefinition) {
        let phrase = phrase.to_lowercase();
        if !self.skills.contains_key(&phrase) {
            self.phrases.push(phrase.clone());
        }
        self.skills.insert(phrase, skill);
    }

    pub fn get(&self, phrase: &str) -> Option<&SkillDefinition> {
        self.skills.get(&phrase.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SkillDefinition)> {
        self.phrases
            .iter()
            .filter_map(|phrase| Some((phrase.as_str(), self.skills.get(phrase)?)))
    }
}

/// Builds a trigger map from loaded skills.
pub fn build_trigger_map<'a>(skills: impl IntoIterator<Item = &'a SkillDefinition>) -> TriggerMap {
    let mut map = TriggerMap::default();
    for skill in skills {
        for trigger in &skill.triggers {
            map.insert(trigger, skill.clone());
        }
    }
    map
}

/// Finds skills whose triggers appear in `query`.
///
/// Longer (more specific) triggers rank first; each skill appears once.
pub fn find_matching_skills<'a>(query: &str, map: &'a TriggerMap) -> Vec<&'a SkillDefinition> {
    let query = query.to_lowercase();

    let mut matches: Vec<(usize, &SkillDefinition)> = map
        .iter()
        .filter(|(trigger, _)| query.contains(trigger))
        .map(|(trigger, skill)| (trigger.len(), skill))
        .collect();
    matches.sort_by(|a, b| b.0.cmp(&a.0));

    let mut seen = HashSet::new();
    let mut skills = Vec::new();
    for (_, skill) in matches {
        if seen.insert(skill.id.as_str()) {
            skills.push(skill);
        }
    }
    skills
}

/// `None` when no pattern compiled, so an all-invalid include list filters
/// nothing.
fn glob_set(patterns: &[String], source: &Path) -> (Option<GlobSet>, Vec<LoadError>) {
    let mut errors = Vec::new();
    let globs: Vec<Glob> = patterns
        .iter()
        .filter_map(|pattern| {
            Glob::new(pattern)
                .inspect_err(|err| {
                    errors.push(LoadError::new(
                        source,
                        format!("Invalid skill glob pattern '{pattern}': {err}"),
                    ));
                })
                .ok()
        })
        .collect();
    if globs.is_empty() {
        return (None, errors);
    }

    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        builder.add(glob);
    }
    match builder.build() {
        Ok(set) => (Some(set), errors),
        Err(err) => {
            errors.push(LoadError::new(source, format!("Skill globs: {err}")));
            (None, errors)
        }
    }
}
