//! Runtime for a chat session
//!
//! Owns the chat state and transcript, feeds events through the pure
//! transition function and executes the resulting effects. Connected views
//! follow along through a broadcast channel of `ChatUpdate`s.

mod delay;
mod executor;

pub use delay::TaskSlot;
pub use executor::ChatRuntime;

use crate::state_machine::{ChatContext, ChatStep, Event};
use crate::transcript::Message;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// Updates sent to connected views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    /// Full view of the session, sent on request
    Snapshot {
        messages: Vec<Message>,
        step: ChatStep,
        typing: bool,
    },
    Message(Message),
    Typing(bool),
    /// Transcript emptied; new messages follow
    Cleared,
    /// Validator message for the input box; the step did not change
    InputRejected { message: String },
    StepChanged { step: ChatStep },
}

/// Commands processed by the runtime loop
#[derive(Debug)]
pub(crate) enum Command {
    Event(Event),
    Sync,
    ReplyDue(u64),
}

#[derive(Debug, Error)]
#[error("Chat runtime has stopped")]
pub struct RuntimeGone;

/// Handle to interact with a running chat
#[derive(Clone)]
pub struct ChatHandle {
    command_tx: mpsc::Sender<Command>,
    broadcast_tx: broadcast::Sender<ChatUpdate>,
}

impl ChatHandle {
    /// Start a runtime in the background. It stops once every handle is dropped.
    pub fn spawn(context: ChatContext, typing_delay: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);

        let runtime = ChatRuntime::new(
            context,
            typing_delay,
            command_rx,
            command_tx.downgrade(),
            broadcast_tx.clone(),
        );
        tokio::spawn(runtime.run());

        Self {
            command_tx,
            broadcast_tx,
        }
    }

    pub async fn send(&self, event: Event) -> Result<(), RuntimeGone> {
        self.command_tx
            .send(Command::Event(event))
            .await
            .map_err(|_| RuntimeGone)
    }

    /// Ask for a `ChatUpdate::Snapshot`
    pub async fn sync(&self) -> Result<(), RuntimeGone> {
        self.command_tx
            .send(Command::Sync)
            .await
            .map_err(|_| RuntimeGone)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatUpdate> {
        self.broadcast_tx.subscribe()
    }
}
