//! Skill command handlers.

use std::path::Path;

use anyhow::Result;
use beth_core::config::Config;
use beth_core::skills::{self, SkillFilters, SkillLoadResult};

use super::report_load_errors;

/// Loads skills honouring the configured include/ignore filters.
fn load(dir: &Path, config: &Config) -> Result<SkillLoadResult> {
    let (filters, filter_errors) = SkillFilters::new(
        &config.skills.include_skills,
        &config.skills.ignored_skills,
        dir,
    );
    report_load_errors(&filter_errors);

    let result = skills::load_skills_with_filters(dir, &filters);
    report_load_errors(&result.errors);
    if result.is_empty() {
        anyhow::bail!("No skills loaded from {}", dir.display());
    }
    Ok(result)
}

pub fn list(dir: &Path, config: &Config) -> Result<()> {
    let result = load(dir, config)?;
    for skill in &result.items {
        if skill.triggers.is_empty() {
            println!("{}  {}", skill.id, skill.frontmatter.name);
        } else {
            println!(
                "{}  {}  [{}]",
                skill.id,
                skill.frontmatter.name,
                skill.triggers.join(", ")
            );
        }
    }
    Ok(())
}

pub fn matching(dir: &Path, query: &str, config: &Config) -> Result<()> {
    let result = load(dir, config)?;
    let map = skills::build_trigger_map(&result.items);
    let matches = skills::find_matching_skills(query, &map);
    if matches.is_empty() {
        println!("No matching skills.");
    }
    for skill in matches {
        println!("{}  {}", skill.id, skill.frontmatter.name);
    }
    Ok(())
}
