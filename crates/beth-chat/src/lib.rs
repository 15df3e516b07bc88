//! Conversation routing and orchestration.
//!
//! The orchestrator follows a reducer/runtime split:
//! - `update` is the reducer: it consumes a `ChatState` and a `ChatEvent` and
//!   returns the next state plus `ChatEffect`s. It never sleeps or spawns.
//! - `session::ChatSession` is the runtime: it owns the state, executes
//!   effects (timers, responder calls) and feeds the resulting events back
//!   through its inbox.
//!
//! ```text
//! submit ─► update ─► effects ─► runtime timers ─► inbox ─► update ─► ...
//! ```

pub mod effects;
pub mod events;
pub mod handoff;
pub mod message;
pub mod responder;
pub mod roster;
pub mod router;
pub mod session;
pub mod state;
pub mod update;

pub use effects::ChatEffect;
pub use events::{Alert, ChatEvent, PendingReply, Step};
pub use message::{ChatCard, ChatMessage, MessageKind};
pub use responder::{AgentReply, Responder, ScriptedResponder};
pub use roster::{Persona, Roster};
pub use router::{KeywordRouter, RouteDecision, Router};
pub use session::{ChatSession, TurnInFlight};
pub use state::{ChatState, Generation, Phase};
pub use update::{ChatContext, Timings, update};
