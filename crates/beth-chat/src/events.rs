//! Inputs to the conversation reducer.

use std::time::Duration;

use crate::responder::{AgentReply, fraud_alert_card};
use crate::state::Generation;

/// Delay before an alert's announcement appears.
pub const ALERT_ANNOUNCE_DELAY: Duration = Duration::from_millis(300);
/// Delay from the alert until the target agent takes over.
pub const ALERT_HANDOFF_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// User sent a message.
    Submit { text: String },
    /// Proactive interruption routed to a specific agent.
    Alert(Alert),
    /// Start over with a fresh greeting.
    Reset,
    /// A scheduled continuation fired.
    Continue { generation: Generation, step: Step },
}

/// Deferred stage of a turn.
#[derive(Debug, Clone)]
pub enum Step {
    /// Show the handoff announcement, then hand over after `then`.
    Announce {
        from: String,
        to: String,
        text: String,
        then: Duration,
        reply: PendingReply,
    },
    /// Make `to` the current agent and start its reply.
    TakeOver { to: String, reply: PendingReply },
    /// Deliver an agent's reply, or the reason it failed.
    Reply {
        agent: String,
        reply: Result<AgentReply, String>,
    },
}

/// How the reply at the end of a handoff is produced.
#[derive(Debug, Clone)]
pub enum PendingReply {
    /// Ask the responder to answer this user text.
    Respond { text: String },
    /// Fixed reply, e.g. from an alert.
    Scripted(AgentReply),
}

/// A side-channel interruption that pulls the conversation to `target`.
#[derive(Debug, Clone)]
pub struct Alert {
    pub target: String,
    /// Handoff text spoken by the current agent.
    pub announcement: String,
    pub reply: AgentReply,
}

impl Alert {
    /// Sentinel flags the suspicious ATM withdrawal.
    pub fn suspicious_activity() -> Self {
        Self {
            target: "sentinel".to_string(),
            announcement: "⚠️ Urgent: I'm routing you to Sentinel. We've detected suspicious activity on your account.".to_string(),
            reply: AgentReply::text(
                "🚨 ALERT: I've detected a suspicious transaction that requires your immediate attention.",
            )
            .with_card(fraud_alert_card()),
        }
    }
}
