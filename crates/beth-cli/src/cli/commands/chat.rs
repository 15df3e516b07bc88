//! Interactive chat over stdin.
//!
//! Plain lines are sent as user messages. `/alert` raises the suspicious
//! activity alert, `/reset` starts over, `/quit` exits.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use beth_chat::{
    Alert, ChatContext, ChatMessage, ChatSession, MessageKind, Roster, ScriptedResponder,
};
use beth_core::agents::{self, AgentDefinition};
use beth_core::config::Config;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::report_load_errors;

pub async fn run(agents_dir: &Path, config: &Config) -> Result<()> {
    let team = load_team(agents_dir);
    let ctx = ChatContext::from_config(config, &team).context("build chat team")?;
    let mut session = ChatSession::new(ctx, Arc::new(ScriptedResponder));

    let mut transcript = Transcript::default();
    transcript.flush(&session);
    println!("(type /alert, /reset or /quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset();
                transcript = Transcript::default();
            }
            "/alert" => session.trigger_alert(Alert::suspicious_activity()),
            text => session.submit(text)?,
        }

        transcript.flush(&session);
        while session.step().await {
            transcript.flush(&session);
        }
    }
    Ok(())
}

/// Agents from `dir`, or an empty team (built-in personas) when none load.
fn load_team(dir: &Path) -> Vec<AgentDefinition> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no agents directory, using built-in team");
        return Vec::new();
    }
    let result = agents::load_agents(dir);
    report_load_errors(&result.errors);
    result.items
}

/// Tracks what has already been printed.
#[derive(Default)]
struct Transcript {
    printed: usize,
    thinking: bool,
}

impl Transcript {
    fn flush(&mut self, session: &ChatSession) {
        let state = session.state();
        let roster = session.roster();
        for message in state.messages.iter().skip(self.printed) {
            print_message(roster, message);
        }
        self.printed = state.messages.len();

        let thinking = state.is_thinking();
        if thinking && !self.thinking {
            println!("  {} is typing...", roster.display_name(&state.current_agent));
        }
        self.thinking = thinking;
    }
}

fn print_message(roster: &Roster, message: &ChatMessage) {
    match &message.kind {
        // already echoed by the terminal
        MessageKind::User => {}
        MessageKind::Agent { agent_id, card } => {
            println!("{}: {}", roster.display_name(agent_id), message.content);
            if let Some(card) = card {
                println!("  [{}] {}", card.kind(), card.data());
            }
        }
        MessageKind::System => println!("! {}", message.content),
        MessageKind::Handoff { from, to } => println!(
            "{} → {}: {}",
            roster.display_name(from),
            roster.display_name(to),
            message.content
        ),
    }
}
