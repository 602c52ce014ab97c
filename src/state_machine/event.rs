//! Events that can occur in a chat

use crate::navigation::ChatAction;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The hosting screen mounted the chat with an initial action
    Begin(ChatAction),
    /// Free text typed into the input box
    Text(String),
    /// One of the offered option labels was picked
    Choice(String),
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::Text(text.into())
    }

    pub fn choice(label: impl Into<String>) -> Self {
        Event::Choice(label.into())
    }
}
