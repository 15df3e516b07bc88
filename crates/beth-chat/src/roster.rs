//! Personas taking part in a conversation.

use anyhow::Result;
use beth_core::agents::AgentDefinition;
use beth_core::definitions::same_id;

/// Agent id of the built-in orchestrating persona.
pub const DEFAULT_AGENT: &str = "atlas";

/// A named persona the user can talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub role: String,
    pub greeting: String,
}

impl Persona {
    pub fn new(id: &str, name: &str, role: &str, greeting: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            greeting: greeting.to_string(),
        }
    }
}

/// Ordered set of personas plus the default (orchestrating) agent.
#[derive(Debug, Clone)]
pub struct Roster {
    personas: Vec<Persona>,
    default_agent: String,
}

impl Default for Roster {
    fn default() -> Self {
        Self::banking()
    }
}

impl Roster {
    /// The built-in banking team.
    pub fn banking() -> Self {
        Self {
            personas: builtin_personas(),
            default_agent: DEFAULT_AGENT.to_string(),
        }
    }

    /// Builds a roster from a loaded agent catalog.
    ///
    /// Built-in personas with a matching id contribute their role and
    /// greeting; other agents get one derived from their frontmatter.
    ///
    /// # Errors
    /// Returns an error if `default_agent` is not in the catalog.
    pub fn from_definitions(agents: &[AgentDefinition], default_agent: &str) -> Result<Self> {
        let builtin = builtin_personas();
        let personas: Vec<Persona> = agents
            .iter()
            .map(|agent| {
                let name = agent.frontmatter.name.clone();
                match builtin.iter().find(|p| same_id(&p.id, &agent.id)) {
                    Some(known) => Persona {
                        id: agent.id.clone(),
                        name,
                        ..known.clone()
                    },
                    None => Persona {
                        id: agent.id.clone(),
                        role: agent
                            .frontmatter
                            .description
                            .clone()
                            .unwrap_or_else(|| "Specialist".to_string()),
                        greeting: format!("Hello! I'm {name}. How can I help you today?"),
                        name,
                    },
                }
            })
            .collect();

        let Some(default) = personas
            .iter()
            .find(|p| same_id(&p.id, default_agent))
        else {
            anyhow::bail!("Default agent '{default_agent}' is not in the agent catalog");
        };

        Ok(Self {
            default_agent: default.id.clone(),
            personas,
        })
    }

    /// Replaces the default agent.
    ///
    /// # Errors
    /// Returns an error if the agent is not part of the roster.
    pub fn with_default_agent(mut self, id: &str) -> Result<Self> {
        let Some(persona) = self.get(id) else {
            anyhow::bail!("Unknown default agent '{id}'");
        };
        self.default_agent = persona.id.clone();
        Ok(self)
    }

    pub fn default_agent(&self) -> &str {
        &self.default_agent
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| same_id(&p.id, id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.personas.iter().map(|p| p.id.as_str())
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    /// Display name for an agent id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |p| p.name.as_str())
    }

    /// Opening line for an agent.
    pub fn greeting(&self, id: &str) -> String {
        self.get(id).map_or_else(
            || format!("Hello! I'm {id}. How can I help you today?"),
            |p| p.greeting.clone(),
        )
    }
}

fn builtin_personas() -> Vec<Persona> {
    vec![
        Persona::new(
            "atlas",
            "Atlas",
            "Orchestrator",
            "Hello! I'm Atlas, your personal banking orchestrator. How can I help you today?",
        ),
        Persona::new(
            "penny",
            "Penny",
            "Spending Analyst",
            "Hi there! I'm Penny, your spending analyst. Ready to dive into your finances?",
        ),
        Persona::new(
            "sentinel",
            "Sentinel",
            "Fraud Detection",
            "Hello, I'm Sentinel. Your account security is my top priority. What would you like to review?",
        ),
        Persona::new(
            "nova",
            "Nova",
            "Transfers Specialist",
            "Hey! I'm Nova, and I make transfers lightning fast. Who would you like to send money to?",
        ),
        Persona::new(
            "sage",
            "Sage",
            "Financial Advisor",
            "Greetings! I'm Sage, your financial advisor. Let's work on building your wealth together.",
        ),
    ]
}
