//! Session runtime.
//!
//! `ChatSession` owns the state, runs events through `update`, and executes
//! the returned effects: timers become Tokio tasks that race a sleep against
//! the session's cancellation token and post their continuation back to the
//! inbox. Responder calls run on the blocking pool so a slow or panicking
//! responder cannot stall the session.
//!
//! Methods that dispatch events must be called from within a Tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::effects::ChatEffect;
use crate::events::{Alert, ChatEvent, Step};
use crate::responder::{Responder, ScriptedResponder};
use crate::roster::Roster;
use crate::state::{ChatState, Generation};
use crate::update::{ChatContext, update};

/// Returned by [`ChatSession::submit`] while a turn is still in flight.
#[derive(Debug)]
pub struct TurnInFlight;

impl std::fmt::Display for TurnInFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A turn is already in progress")
    }
}

impl std::error::Error for TurnInFlight {}

pub struct ChatSession {
    ctx: ChatContext,
    state: ChatState,
    responder: Arc<dyn Responder>,
    inbox_tx: mpsc::UnboundedSender<ChatEvent>,
    inbox_rx: mpsc::UnboundedReceiver<ChatEvent>,
    cancel: CancellationToken,
}

impl ChatSession {
    pub fn new(ctx: ChatContext, responder: Arc<dyn Responder>) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            state: ChatState::seeded(&ctx.roster),
            ctx,
            responder,
            inbox_tx,
            inbox_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Built-in banking team answered by [`ScriptedResponder`].
    pub fn banking() -> Self {
        Self::new(ChatContext::banking(), Arc::new(ScriptedResponder))
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.ctx.roster
    }

    /// Starts a user turn.
    ///
    /// # Errors
    /// Returns [`TurnInFlight`] if the previous turn has not finished.
    pub fn submit(&mut self, text: impl Into<String>) -> Result<()> {
        if self.state.is_busy() {
            return Err(TurnInFlight.into());
        }
        self.dispatch(ChatEvent::Submit { text: text.into() });
        Ok(())
    }

    /// Interrupts whatever is happening and hands the conversation to the
    /// alert's target.
    pub fn trigger_alert(&mut self, alert: Alert) {
        self.dispatch(ChatEvent::Alert(alert));
    }

    /// Cancels pending work and starts over with a fresh greeting.
    pub fn reset(&mut self) {
        self.dispatch(ChatEvent::Reset);
    }

    /// Waits for and applies the next continuation.
    ///
    /// Returns `false` without waiting when no turn is in flight.
    pub async fn step(&mut self) -> bool {
        if !self.state.is_busy() {
            return false;
        }
        let Some(event) = self.inbox_rx.recv().await else {
            return false;
        };
        self.dispatch(event);
        true
    }

    /// Runs the current turn to completion.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    fn dispatch(&mut self, event: ChatEvent) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(&self.ctx, state, event);
        self.state = state;
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: ChatEffect) {
        match effect {
            ChatEffect::Schedule {
                generation,
                delay,
                step,
            } => self.schedule(delay, ChatEvent::Continue { generation, step }),
            ChatEffect::RequestReply {
                generation,
                delay,
                agent,
                text,
            } => self.request_reply(generation, delay, agent, text),
            ChatEffect::CancelPending => {
                debug!("cancelling pending continuations");
                self.cancel.cancel();
                self.cancel = CancellationToken::new();
            }
        }
    }

    fn schedule(&self, delay: Duration, event: ChatEvent) {
        let tx = self.inbox_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(event);
                }
            }
        });
    }

    fn request_reply(
        &self,
        generation: Generation,
        delay: Duration,
        agent: String,
        text: String,
    ) {
        let tx = self.inbox_tx.clone();
        let cancel = self.cancel.clone();
        let responder = Arc::clone(&self.responder);
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }

            let task_agent = agent.clone();
            let joined =
                tokio::task::spawn_blocking(move || responder.respond(&task_agent, &text)).await;
            let reply = match joined {
                Ok(Ok(reply)) => Ok(reply),
                Ok(Err(err)) => Err(format!("{err:#}")),
                Err(err) => Err(err.to_string()),
            };
            if let Err(error) = &reply {
                warn!(agent = %agent, %error, "responder failed");
            }

            if cancel.is_cancelled() {
                return;
            }
            let _ = tx.send(ChatEvent::Continue {
                generation,
                step: Step::Reply { agent, reply },
            });
        });
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
