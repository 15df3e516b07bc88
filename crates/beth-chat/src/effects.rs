//! Commands returned by the reducer for the session runtime to execute.
//!
//! Effects cover timers and responder calls only; the reducer never sleeps
//! or spawns on its own.

use std::time::Duration;

use crate::events::Step;
use crate::state::Generation;

#[derive(Debug, Clone)]
pub enum ChatEffect {
    /// Feed `step` back as `ChatEvent::Continue` after `delay`.
    Schedule {
        generation: Generation,
        delay: Duration,
        step: Step,
    },
    /// After `delay`, ask the responder for `agent`'s answer to `text` and
    /// feed it back as a `Step::Reply`.
    RequestReply {
        generation: Generation,
        delay: Duration,
        agent: String,
        text: String,
    },
    /// Cancel every timer and request scheduled so far.
    CancelPending,
}
