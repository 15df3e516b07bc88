//! Conversation state owned by the session and replaced by the reducer.

use crate::message::ChatMessage;
use crate::roster::Roster;

/// Token identifying the turn a scheduled continuation belongs to.
///
/// Bumped whenever a new turn starts or the session is reset; continuations
/// carrying an older value are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Where the current turn is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// Waiting on a reply from the agent already holding the conversation.
    Thinking { agent: String },
    /// Handoff decided, announcement not yet shown.
    Announcing { from: String, to: String },
    /// Announcement shown, target agent not yet in control.
    Announced { from: String, to: String },
    /// Target agent took over and is preparing its first reply.
    TransitionThinking { agent: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    /// Append-only message log.
    pub messages: Vec<ChatMessage>,
    pub current_agent: String,
    pub phase: Phase,
    pub generation: Generation,
}

impl ChatState {
    /// Fresh state with a single greeting from `agent`.
    pub fn new(agent: &str, greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::agent(agent, greeting, None)],
            current_agent: agent.to_string(),
            phase: Phase::Idle,
            generation: Generation::default(),
        }
    }

    /// Fresh state greeted by the roster's default agent.
    pub fn seeded(roster: &Roster) -> Self {
        let agent = roster.default_agent();
        Self::new(agent, roster.greeting(agent))
    }

    pub fn is_thinking(&self) -> bool {
        matches!(
            self.phase,
            Phase::Thinking { .. } | Phase::TransitionThinking { .. }
        )
    }

    pub fn is_handing_off(&self) -> bool {
        matches!(
            self.phase,
            Phase::Announcing { .. } | Phase::Announced { .. }
        )
    }

    /// True while any turn is in flight.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;

    #[test]
    fn test_seeded_state() {
        let state = ChatState::seeded(&Roster::banking());

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.current_agent, "atlas");
        assert!(matches!(
            &state.messages[0].kind,
            MessageKind::Agent { agent_id, card: None } if agent_id == "atlas"
        ));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_phase_flags() {
        let mut state = ChatState::new("atlas", "hi");

        state.phase = Phase::Announced {
            from: "atlas".into(),
            to: "nova".into(),
        };
        assert!(state.is_handing_off());
        assert!(!state.is_thinking());

        state.phase = Phase::TransitionThinking {
            agent: "nova".into(),
        };
        assert!(state.is_thinking());
        assert!(!state.is_handing_off());
        assert!(state.is_busy());
    }

    #[test]
    fn test_generation_advances() {
        let first = Generation::default();
        assert_ne!(first, first.next());
        assert!(first.next() > first);
    }
}
