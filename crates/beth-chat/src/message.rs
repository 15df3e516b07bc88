//! Conversation log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Structured payload attached to an agent reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ChatCard {
    TransferConfirm(Value),
    SpendingChart(Value),
    FraudAlert(Value),
    AccountSummary(Value),
    BillReminder(Value),
}

impl ChatCard {
    /// Wire name of the card type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TransferConfirm(_) => "transfer-confirm",
            Self::SpendingChart(_) => "spending-chart",
            Self::FraudAlert(_) => "fraud-alert",
            Self::AccountSummary(_) => "account-summary",
            Self::BillReminder(_) => "bill-reminder",
        }
    }

    pub fn data(&self) -> &Value {
        match self {
            Self::TransferConfirm(data)
            | Self::SpendingChart(data)
            | Self::FraudAlert(data)
            | Self::AccountSummary(data)
            | Self::BillReminder(data) => data,
        }
    }
}

/// Who produced a message, plus the fields specific to that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Agent {
        agent_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        card: Option<ChatCard>,
    },
    System,
    Handoff {
        from: String,
        to: String,
    },
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    #[serde(flatten)]
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn with_kind(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: format!("msg-{}", Uuid::new_v4()),
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::User, content)
    }

    pub fn agent(agent_id: &str, content: impl Into<String>, card: Option<ChatCard>) -> Self {
        Self::with_kind(
            MessageKind::Agent {
                agent_id: agent_id.to_string(),
                card,
            },
            content,
        )
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::System, content)
    }

    pub fn handoff(from: &str, to: &str, content: impl Into<String>) -> Self {
        Self::with_kind(
            MessageKind::Handoff {
                from: from.to_string(),
                to: to.to_string(),
            },
            content,
        )
    }

    /// Agent that authored the message; handoffs are spoken by `from`.
    pub fn agent_id(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Agent { agent_id, .. } => Some(agent_id),
            MessageKind::Handoff { from, .. } => Some(from),
            MessageKind::User | MessageKind::System => None,
        }
    }

    pub fn card(&self) -> Option<&ChatCard> {
        match &self.kind {
            MessageKind::Agent { card, .. } => card.as_ref(),
            _ => None,
        }
    }
}
