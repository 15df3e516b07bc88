//! Conversation reducer.
//!
//! `update` is the only place `ChatState` changes. It takes the current state
//! and an event, and returns the next state plus the effects the session must
//! run to move the turn forward.

use std::time::Duration;

use anyhow::Result;
use beth_core::agents::AgentDefinition;
use beth_core::config::{ChatConfig, Config};
use tracing::{debug, warn};

use crate::effects::ChatEffect;
use crate::events::{
    ALERT_ANNOUNCE_DELAY, ALERT_HANDOFF_DELAY, Alert, ChatEvent, PendingReply, Step,
};
use crate::handoff::handoff_message;
use crate::message::ChatMessage;
use crate::responder::AgentReply;
use crate::roster::Roster;
use crate::router::{KeywordRouter, Router};
use crate::state::{ChatState, Phase};

/// Pacing of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Before any agent reply appears.
    pub thinking: Duration,
    /// Before a routed handoff announcement appears.
    pub announce: Duration,
    /// From the start of a routed handoff until the target takes over.
    pub handoff: Duration,
    pub alert_announce: Duration,
    pub alert_handoff: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

impl From<&ChatConfig> for Timings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            thinking: config.thinking_delay(),
            announce: config.announce_delay(),
            handoff: config.handoff_delay(),
            alert_announce: ALERT_ANNOUNCE_DELAY,
            alert_handoff: ALERT_HANDOFF_DELAY,
        }
    }
}

/// Everything the reducer needs besides the state itself.
pub struct ChatContext {
    pub router: Box<dyn Router>,
    pub roster: Roster,
    pub timings: Timings,
}

impl ChatContext {
    pub fn new(router: impl Router + 'static, roster: Roster, timings: Timings) -> Self {
        Self {
            router: Box::new(router),
            roster,
            timings,
        }
    }

    /// Built-in banking team with default pacing.
    pub fn banking() -> Self {
        Self::new(KeywordRouter::banking(), Roster::banking(), Timings::default())
    }

    /// Context for a configured session.
    ///
    /// With a non-empty agent catalog that contains the default agent, the
    /// roster comes from it and routes to agents outside the catalog are
    /// dropped. Otherwise the built-in team is used.
    ///
    /// # Errors
    /// Returns an error if the built-in team is used and the configured
    /// default agent is not part of it.
    pub fn from_config(config: &Config, agents: &[AgentDefinition]) -> Result<Self> {
        let default_agent = &config.chat.default_agent;
        let catalog = if agents.is_empty() {
            None
        } else {
            Roster::from_definitions(agents, default_agent)
                .inspect_err(|err| warn!("{err:#}; using the built-in team"))
                .ok()
        };

        let from_catalog = catalog.is_some();
        let roster = match catalog {
            Some(roster) => roster,
            None => Roster::banking().with_default_agent(default_agent)?,
        };

        let mut router = KeywordRouter::from_config(&config.router, roster.default_agent());
        if from_catalog {
            let ids: Vec<&str> = roster.ids().collect();
            router.retain_agents(&ids);
        }

        Ok(Self::new(router, roster, Timings::from(&config.chat)))
    }
}

/// Applies one event.
pub fn update(
    ctx: &ChatContext,
    mut state: ChatState,
    event: ChatEvent,
) -> (ChatState, Vec<ChatEffect>) {
    match event {
        ChatEvent::Submit { text } => {
            if state.is_busy() {
                debug!(phase = ?state.phase, "ignoring submit while a turn is in flight");
                return (state, vec![]);
            }
            let effects = start_turn(ctx, &mut state, text);
            (state, effects)
        }
        ChatEvent::Alert(alert) => {
            let effects = start_alert(ctx, &mut state, alert);
            (state, effects)
        }
        ChatEvent::Reset => {
            let mut fresh = ChatState::seeded(&ctx.roster);
            fresh.generation = state.generation.next();
            (fresh, vec![ChatEffect::CancelPending])
        }
        ChatEvent::Continue { generation, step } => {
            if generation != state.generation {
                debug!(
                    ?generation,
                    current = ?state.generation,
                    "dropping stale continuation"
                );
                return (state, vec![]);
            }
            let effects = continue_turn(ctx, &mut state, step);
            (state, effects)
        }
    }
}

fn start_turn(ctx: &ChatContext, state: &mut ChatState, text: String) -> Vec<ChatEffect> {
    state.generation = state.generation.next();
    state.messages.push(ChatMessage::user(text.clone()));

    let decision = ctx.router.route(&text, &state.current_agent);
    if !decision.should_handoff {
        let agent = state.current_agent.clone();
        state.phase = Phase::Thinking {
            agent: agent.clone(),
        };
        return vec![ChatEffect::RequestReply {
            generation: state.generation,
            delay: ctx.timings.thinking,
            agent,
            text,
        }];
    }

    let from = state.current_agent.clone();
    let to = decision.target_agent_id;
    state.phase = Phase::Announcing {
        from: from.clone(),
        to: to.clone(),
    };
    vec![ChatEffect::Schedule {
        generation: state.generation,
        delay: ctx.timings.announce,
        step: Step::Announce {
            text: handoff_message(&from, &to),
            from,
            to,
            then: ctx.timings.handoff.saturating_sub(ctx.timings.announce),
            reply: PendingReply::Respond { text },
        },
    }]
}

fn start_alert(ctx: &ChatContext, state: &mut ChatState, alert: Alert) -> Vec<ChatEffect> {
    state.generation = state.generation.next();
    let mut effects = vec![ChatEffect::CancelPending];

    if !ctx.roster.contains(&alert.target) {
        warn!(target_agent = %alert.target, "alert target is not on the team");
        state.phase = Phase::Idle;
        state.messages.push(ChatMessage::system(format!(
            "{} (no '{}' agent is available to take over)",
            alert.reply.text, alert.target
        )));
        return effects;
    }

    let from = state.current_agent.clone();
    if from == alert.target {
        state.phase = Phase::Thinking {
            agent: alert.target.clone(),
        };
        effects.push(ChatEffect::Schedule {
            generation: state.generation,
            delay: ctx.timings.thinking,
            step: Step::Reply {
                agent: alert.target,
                reply: Ok(alert.reply),
            },
        });
        return effects;
    }

    state.phase = Phase::Announcing {
        from: from.clone(),
        to: alert.target.clone(),
    };
    effects.push(ChatEffect::Schedule {
        generation: state.generation,
        delay: ctx.timings.alert_announce,
        step: Step::Announce {
            from,
            to: alert.target,
            text: alert.announcement,
            then: ctx
                .timings
                .alert_handoff
                .saturating_sub(ctx.timings.alert_announce),
            reply: PendingReply::Scripted(alert.reply),
        },
    });
    effects
}

fn continue_turn(ctx: &ChatContext, state: &mut ChatState, step: Step) -> Vec<ChatEffect> {
    match step {
        Step::Announce {
            from,
            to,
            text,
            then,
            reply,
        } => {
            state.messages.push(ChatMessage::handoff(&from, &to, text));
            state.phase = Phase::Announced {
                from,
                to: to.clone(),
            };
            vec![ChatEffect::Schedule {
                generation: state.generation,
                delay: then,
                step: Step::TakeOver { to, reply },
            }]
        }
        Step::TakeOver { to, reply } => {
            state.current_agent.clone_from(&to);
            state.phase = Phase::TransitionThinking { agent: to.clone() };
            let generation = state.generation;
            let delay = ctx.timings.thinking;
            match reply {
                PendingReply::Respond { text } => vec![ChatEffect::RequestReply {
                    generation,
                    delay,
                    agent: to,
                    text,
                }],
                PendingReply::Scripted(reply) => vec![ChatEffect::Schedule {
                    generation,
                    delay,
                    step: Step::Reply {
                        agent: to,
                        reply: Ok(reply),
                    },
                }],
            }
        }
        Step::Reply { agent, reply } => {
            state.messages.push(reply_message(&ctx.roster, &agent, reply));
            state.phase = Phase::Idle;
            vec![]
        }
    }
}

fn reply_message(roster: &Roster, agent: &str, reply: Result<AgentReply, String>) -> ChatMessage {
    match reply {
        Ok(AgentReply { text, card }) => ChatMessage::agent(agent, text, card),
        Err(error) => ChatMessage::system(format!(
            "{} couldn't respond: {error}",
            roster.display_name(agent)
        )),
    }
}
