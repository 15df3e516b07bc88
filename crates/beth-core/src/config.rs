//! Configuration management for Beth.
//!
//! Loads configuration from ${BETH_HOME}/config.toml with sensible defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::agents::DEFAULT_AGENTS_DIR;
use crate::skills::DEFAULT_SKILLS_DIR;

pub mod paths {
    //! Path resolution for Beth configuration and data directories.
    //!
    //! `BETH_HOME` resolution order:
    //! 1. `BETH_HOME` environment variable (if set)
    //! 2. ~/.config/beth (default)

    use std::path::PathBuf;

    /// Returns the Beth home directory.
    pub fn beth_home() -> PathBuf {
        if let Ok(home) = std::env::var("BETH_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map_or_else(|| PathBuf::from(".beth"), |h| h.join(".config").join("beth"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        beth_home().join("config.toml")
    }
}

/// Conversation timing and persona configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Orchestrating agent that greets the user and owns unrouted turns.
    pub default_agent: String,
    /// Delay before an agent reply appears.
    pub thinking_delay_ms: u64,
    /// Delay before a handoff announcement appears.
    pub announce_delay_ms: u64,
    /// Delay from the start of a handoff until the new agent takes over.
    pub handoff_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_agent: "atlas".to_string(),
            thinking_delay_ms: 1500,
            announce_delay_ms: 500,
            handoff_delay_ms: 1000,
        }
    }
}

impl ChatConfig {
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    pub fn announce_delay(&self) -> Duration {
        Duration::from_millis(self.announce_delay_ms)
    }

    pub fn handoff_delay(&self) -> Duration {
        Duration::from_millis(self.handoff_delay_ms)
    }
}

/// Keyword routing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Agents checked first when a message matches several vocabularies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<String>,
    /// Per-agent keyword overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keywords: BTreeMap<String, Vec<String>>,
}

/// Skill discovery configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_skills: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `BETH_LOG` is unset.
    pub level: String,
    /// Write logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `*.agent.md` files, relative to the working directory.
    pub agents_dir: PathBuf,

    /// Directory holding `<skill>/SKILL.md` folders.
    pub skills_dir: PathBuf,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub skills: SkillsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agents_dir: PathBuf::from(DEFAULT_AGENTS_DIR),
            skills_dir: PathBuf::from(DEFAULT_SKILLS_DIR),
            chat: ChatConfig::default(),
            router: RouterConfig::default(),
            skills: SkillsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Returns the default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Resolves the agents directory against `root` unless it is absolute.
    pub fn agents_dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.agents_dir)
    }

    /// Resolves the skills directory against `root` unless it is absolute.
    pub fn skills_dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.skills_dir)
    }
}
