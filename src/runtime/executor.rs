//! Chat runtime executor

use super::delay::TaskSlot;
use super::{ChatUpdate, Command};

use crate::navigation::ChatAction;
use crate::state_machine::script::{CHOOSE_AN_OPTION, TYPE_AN_ANSWER};
use crate::state_machine::{
    opening, transition, BotPrompt, ChatContext, ChatState, Effect, Event, TransitionError,
};
use crate::transcript::{Origin, Transcript};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Runs one chat session: state, transcript and the pending bot reply
pub struct ChatRuntime {
    context: ChatContext,
    state: ChatState,
    transcript: Transcript,
    typing_delay: Duration,
    command_rx: mpsc::Receiver<Command>,
    /// Weak so the loop ends when the last handle goes away
    command_tx: mpsc::WeakSender<Command>,
    broadcast_tx: broadcast::Sender<ChatUpdate>,
    /// Timer for the bot reply currently "being typed"
    reply_slot: TaskSlot,
    queued_reply: Option<BotPrompt>,
}

impl ChatRuntime {
    pub(crate) fn new(
        context: ChatContext,
        typing_delay: Duration,
        command_rx: mpsc::Receiver<Command>,
        command_tx: mpsc::WeakSender<Command>,
        broadcast_tx: broadcast::Sender<ChatUpdate>,
    ) -> Self {
        let (state, greeting) = opening(ChatAction::Certificates);
        let mut transcript = Transcript::new();
        transcript.push(Origin::Bot, greeting.text, greeting.options);

        Self {
            context,
            state,
            transcript,
            typing_delay,
            command_rx,
            command_tx,
            broadcast_tx,
            reply_slot: TaskSlot::new(),
            queued_reply: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting chat runtime");

        while let Some(command) = self.command_rx.recv().await {
            match command {
                Command::Event(event) => self.process_event(event),
                Command::Sync => self.send_snapshot(),
                Command::ReplyDue(ticket) => self.deliver_reply(ticket),
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Chat runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        // A reply still being typed lands before the next turn is handled
        self.flush_pending_reply();

        let from = self.state.step;
        match transition(&self.state, &self.context, event) {
            Ok(result) => {
                self.state = result.new_state;
                if self.state.step != from {
                    tracing::debug!(
                        session_id = %self.context.session_id,
                        from = %from,
                        to = %self.state.step,
                        "Step transition"
                    );
                }
                for effect in result.effects {
                    self.execute_effect(effect);
                }
                self.broadcast(ChatUpdate::StepChanged {
                    step: self.state.step,
                });
            }
            Err(TransitionError::EmptyInput) => {
                tracing::trace!("Ignoring blank input");
            }
            Err(TransitionError::Rejected(invalid)) => {
                tracing::debug!(step = %from, field = %invalid.field, "Input rejected");
                self.broadcast(ChatUpdate::InputRejected {
                    message: invalid.to_string(),
                });
            }
            Err(e @ (TransitionError::ExpectsChoice(_) | TransitionError::ExpectsText(_))) => {
                tracing::warn!(error = %e, "Input does not fit the current step");
                let hint = if matches!(e, TransitionError::ExpectsChoice(_)) {
                    CHOOSE_AN_OPTION
                } else {
                    TYPE_AN_ANSWER
                };
                self.post(Origin::Error, hint, None);
            }
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ClearTranscript => {
                self.transcript.clear();
                self.broadcast(ChatUpdate::Cleared);
            }
            Effect::PostUserMessage { text } => {
                self.post(Origin::User, text, None);
            }
            Effect::PostBotMessage { prompt, typing } => {
                if typing && !self.typing_delay.is_zero() {
                    self.schedule_reply(prompt);
                } else {
                    self.post(Origin::Bot, prompt.text, prompt.options);
                }
            }
        }
    }

    fn schedule_reply(&mut self, prompt: BotPrompt) {
        self.flush_pending_reply();
        self.queued_reply = Some(prompt);

        let command_tx = self.command_tx.clone();
        self.reply_slot
            .schedule(self.typing_delay, move |ticket| async move {
                if let Some(tx) = command_tx.upgrade() {
                    let _ = tx.send(Command::ReplyDue(ticket)).await;
                }
            });
        self.broadcast(ChatUpdate::Typing(true));
    }

    fn deliver_reply(&mut self, ticket: u64) {
        if !self.reply_slot.complete(ticket) {
            tracing::debug!(ticket, "Ignoring stale reply timer");
            return;
        }
        if let Some(prompt) = self.queued_reply.take() {
            self.post(Origin::Bot, prompt.text, prompt.options);
        }
        self.broadcast(ChatUpdate::Typing(false));
    }

    /// Commit the queued reply right away, cancelling its timer
    fn flush_pending_reply(&mut self) {
        if !self.reply_slot.cancel() {
            return;
        }
        if let Some(prompt) = self.queued_reply.take() {
            tracing::debug!("Flushing pending reply");
            self.post(Origin::Bot, prompt.text, prompt.options);
        }
        self.broadcast(ChatUpdate::Typing(false));
    }

    fn post(&mut self, origin: Origin, text: impl Into<String>, options: Option<Vec<String>>) {
        let message = self.transcript.push(origin, text, options).clone();
        self.broadcast(ChatUpdate::Message(message));
    }

    fn send_snapshot(&self) {
        self.broadcast(ChatUpdate::Snapshot {
            messages: self.transcript.messages().to_vec(),
            step: self.state.step,
            typing: self.reply_slot.is_pending(),
        });
    }

    fn broadcast(&self, update: ChatUpdate) {
        // No subscribers is fine; views resync on connect
        let _ = self.broadcast_tx.send(update);
    }
}
