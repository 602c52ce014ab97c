//! Scripted chat state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod script;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{BotPrompt, ChatContext, ChatState, ChatStep, SessionData};
pub use transition::{opening, transition, TransitionError};
