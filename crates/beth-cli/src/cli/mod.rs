//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use beth_core::{config, logging};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "beth")]
#[command(version)]
#[command(about = "Agent and skill catalogs with conversation routing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root that catalog directories are resolved against
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Inspect agent definitions
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Inspect skill definitions and trigger matching
    Skills {
        #[command(subcommand)]
        command: SkillCommands,
    },
    /// Show which agent a message would be routed to
    Route {
        /// The user message to classify
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Agent currently holding the conversation (default: configured default agent)
        #[arg(long, value_name = "ID")]
        current: Option<String>,
    },
    /// Talk to the agent team in an interactive session
    Chat {
        /// Load the team from this agents directory instead of the configured one
        #[arg(long, value_name = "DIR")]
        agents_dir: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
struct DirArgs {
    /// Catalog directory (default: from config)
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum AgentCommands {
    /// Lists loaded agents
    List {
        #[command(flatten)]
        dir: DirArgs,
    },
    /// Shows one agent's definition
    Show {
        /// Agent id (case-insensitive)
        #[arg(value_name = "ID")]
        id: String,
        #[command(flatten)]
        dir: DirArgs,
    },
    /// Lists agents marked `infer: true`
    Inferable {
        #[command(flatten)]
        dir: DirArgs,
    },
}

#[derive(clap::Subcommand)]
enum SkillCommands {
    /// Lists loaded skills with their triggers
    List {
        #[command(flatten)]
        dir: DirArgs,
    },
    /// Lists skills whose triggers appear in the query, best match first
    Match {
        /// Free text to match against trigger phrases
        #[arg(value_name = "QUERY")]
        query: String,
        #[command(flatten)]
        dir: DirArgs,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config.logging).context("init logging")?;

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli, &config).await })
}

async fn dispatch(cli: Cli, config: &config::Config) -> Result<()> {
    let Cli { command, root } = cli;
    let agents_dir = |dir: DirArgs| dir.dir.unwrap_or_else(|| config.agents_dir_in(&root));
    let skills_dir = |dir: DirArgs| dir.dir.unwrap_or_else(|| config.skills_dir_in(&root));

    match command {
        Commands::Agents { command } => match command {
            AgentCommands::List { dir } => commands::agents::list(&agents_dir(dir)),
            AgentCommands::Show { id, dir } => commands::agents::show(&agents_dir(dir), &id),
            AgentCommands::Inferable { dir } => commands::agents::inferable(&agents_dir(dir)),
        },

        Commands::Skills { command } => match command {
            SkillCommands::List { dir } => commands::skills::list(&skills_dir(dir), config),
            SkillCommands::Match { query, dir } => {
                commands::skills::matching(&skills_dir(dir), &query, config)
            }
        },

        Commands::Route { message, current } => {
            commands::route::run(&message, current.as_deref(), config);
            Ok(())
        }

        Commands::Chat { agents_dir: dir } => {
            let dir = dir.unwrap_or_else(|| config.agents_dir_in(&root));
            commands::chat::run(&dir, config).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
