//! Agent command handlers.

use std::path::Path;

use anyhow::Result;
use beth_core::agents::{self, AgentDefinition, AgentLoadResult};

use super::report_load_errors;

/// Loads the catalog, reporting per-file errors. Fails when nothing loaded.
fn load(dir: &Path) -> Result<AgentLoadResult> {
    let result = agents::load_agents(dir);
    report_load_errors(&result.errors);
    if result.is_empty() {
        anyhow::bail!("No agents loaded from {}", dir.display());
    }
    Ok(result)
}

fn print_summary(agent: &AgentDefinition) {
    match &agent.frontmatter.description {
        Some(description) => println!("{}  {}  {}", agent.id, agent.frontmatter.name, description),
        None => println!("{}  {}", agent.id, agent.frontmatter.name),
    }
}

pub fn list(dir: &Path) -> Result<()> {
    let result = load(dir)?;
    for agent in &result.items {
        print_summary(agent);
    }
    Ok(())
}

pub fn show(dir: &Path, id: &str) -> Result<()> {
    let result = load(dir)?;
    let Some(agent) = agents::get_agent_by_id(&result, id) else {
        anyhow::bail!("Agent '{id}' not found in {}", dir.display());
    };

    let frontmatter = &agent.frontmatter;
    println!("id: {}", agent.id);
    println!("name: {}", frontmatter.name);
    if let Some(description) = &frontmatter.description {
        println!("description: {description}");
    }
    if let Some(model) = &frontmatter.model {
        println!("model: {model}");
    }
    if let Some(tools) = &frontmatter.tools {
        println!("tools: {}", tools.join(", "));
    }
    if let Some(infer) = frontmatter.infer {
        println!("infer: {infer}");
    }
    if let Some(handoffs) = &frontmatter.handoffs {
        println!("handoffs:");
        for handoff in handoffs {
            let send = if handoff.send == Some(true) { " (send)" } else { "" };
            println!("  {} -> {}{send}", handoff.label, handoff.agent);
        }
    }
    println!("source: {}", agent.source_path.display());
    if !agent.body.is_empty() {
        println!();
        println!("{}", agent.body);
    }
    Ok(())
}

pub fn inferable(dir: &Path) -> Result<()> {
    let result = load(dir)?;
    let inferable = agents::inferable_agents(&result);
    if inferable.is_empty() {
        println!("No inferable agents.");
    }
    for agent in inferable {
        print_summary(agent);
    }
    Ok(())
}
