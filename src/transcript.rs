//! Chat transcript: an append-only message log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a message came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Bot,
    User,
    Error,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Bot => write!(f, "bot"),
            Origin::User => write!(f, "user"),
            Origin::Error => write!(f, "error"),
        }
    }
}

/// A transcript entry. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub origin: Origin,
    pub text: String,
    pub options: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// `HH:MM` as shown under each bubble
    pub fn time_label(&self) -> String {
        self.created_at
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids keep counting across `clear` so they stay unique per session.
    pub fn push(
        &mut self,
        origin: Origin,
        text: impl Into<String>,
        options: Option<Vec<String>>,
    ) -> &Message {
        self.next_id += 1;
        self.messages.push(Message {
            id: self.next_id,
            origin,
            text: text.into(),
            options,
            created_at: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_and_survive_clear() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.push(Origin::Bot, "Olá", None).id, 1);
        assert_eq!(transcript.push(Origin::User, "Oi", None).id, 2);

        transcript.clear();
        assert!(transcript.messages().is_empty());
        assert_eq!(transcript.push(Origin::Bot, "Olá de novo", None).id, 3);
        assert_eq!(transcript.messages().len(), 1);
    }

    #[test]
    fn test_messages_keep_order_and_options() {
        let mut transcript = Transcript::new();
        transcript.push(
            Origin::Bot,
            "Escolha",
            Some(vec!["A".to_string(), "B".to_string()]),
        );
        transcript.push(Origin::User, "A", None);

        let origins: Vec<_> = transcript.messages().iter().map(|m| m.origin).collect();
        assert_eq!(origins, vec![Origin::Bot, Origin::User]);
        assert_eq!(
            transcript.messages()[0].options.as_deref(),
            Some(&["A".to_string(), "B".to_string()][..])
        );
        assert_eq!(transcript.messages()[1].time_label().len(), 5);
    }
}
