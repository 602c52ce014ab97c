//! Effects produced by state transitions

use super::state::BotPrompt;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Drop every message shown so far
    ClearTranscript,

    /// Echo what the user typed or picked
    PostUserMessage { text: String },

    /// Show a bot message. `typing` asks the runtime to show the typing
    /// indicator for the configured delay first.
    PostBotMessage { prompt: BotPrompt, typing: bool },
}

impl Effect {
    pub fn user(text: impl Into<String>) -> Self {
        Effect::PostUserMessage { text: text.into() }
    }

    /// Bot reply after the typing delay
    pub fn reply(prompt: BotPrompt) -> Self {
        Effect::PostBotMessage {
            prompt,
            typing: true,
        }
    }

    /// Bot message shown immediately
    pub fn announce(prompt: BotPrompt) -> Self {
        Effect::PostBotMessage {
            prompt,
            typing: false,
        }
    }
}
