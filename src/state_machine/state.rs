//! Chat state types

use crate::protocol::ProtocolSource;
use crate::validation::TextRule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::script;

// ============================================================================
// Steps
// ============================================================================

/// Where the scripted conversation currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChatStep {
    /// Waiting for a certificate type to be picked
    #[default]
    CertificateType,
    Name,
    Cpf,
    Address,
    BuildingType,
    /// Shown after the request summary
    Menu,

    // Visit scheduling
    Phone,
    VisitDate,
    VisitTime,
    MenuAfterVisit,

    // Protocol lookup
    ProtocolNumber,
    MenuAfterProtocol,

    // Contact request
    PhoneForContact,
    ContactReason,
    ContactTime,
    MenuAfterContact,
}

/// What kind of input a step accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput {
    FreeText(TextRule),
    Choice(&'static [&'static str]),
}

impl ChatStep {
    #[cfg(test)]
    pub const ALL: [ChatStep; 16] = [
        ChatStep::CertificateType,
        ChatStep::Name,
        ChatStep::Cpf,
        ChatStep::Address,
        ChatStep::BuildingType,
        ChatStep::Menu,
        ChatStep::Phone,
        ChatStep::VisitDate,
        ChatStep::VisitTime,
        ChatStep::MenuAfterVisit,
        ChatStep::ProtocolNumber,
        ChatStep::MenuAfterProtocol,
        ChatStep::PhoneForContact,
        ChatStep::ContactReason,
        ChatStep::ContactTime,
        ChatStep::MenuAfterContact,
    ];

    pub fn input(self) -> StepInput {
        match self {
            ChatStep::Name => StepInput::FreeText(TextRule::Name),
            ChatStep::Cpf => StepInput::FreeText(TextRule::Cpf),
            ChatStep::Address => StepInput::FreeText(TextRule::Address),
            ChatStep::Phone | ChatStep::PhoneForContact => StepInput::FreeText(TextRule::Phone),
            ChatStep::VisitDate => StepInput::FreeText(TextRule::Date),
            ChatStep::ProtocolNumber => StepInput::FreeText(TextRule::Protocol),
            ChatStep::ContactReason => StepInput::FreeText(TextRule::ContactReason),
            ChatStep::CertificateType => StepInput::Choice(script::CERTIFICATE_TYPES),
            ChatStep::BuildingType => StepInput::Choice(script::BUILDING_TYPES),
            ChatStep::VisitTime => StepInput::Choice(script::VISIT_TIMES),
            ChatStep::ContactTime => StepInput::Choice(script::CONTACT_TIMES),
            ChatStep::Menu => StepInput::Choice(script::MENU_OPTIONS),
            ChatStep::MenuAfterVisit | ChatStep::MenuAfterContact => {
                StepInput::Choice(script::AFTER_VISIT_OPTIONS)
            }
            ChatStep::MenuAfterProtocol => StepInput::Choice(script::AFTER_PROTOCOL_OPTIONS),
        }
    }

    /// The validator for free-text steps
    pub fn text_rule(self) -> Option<TextRule> {
        match self.input() {
            StepInput::FreeText(rule) => Some(rule),
            StepInput::Choice(_) => None,
        }
    }

    pub fn accepts_text(self) -> bool {
        self.text_rule().is_some()
    }

    /// One of the menus that close a flow
    #[cfg(test)]
    pub fn is_menu(self) -> bool {
        matches!(
            self,
            ChatStep::Menu
                | ChatStep::MenuAfterVisit
                | ChatStep::MenuAfterProtocol
                | ChatStep::MenuAfterContact
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChatStep::CertificateType => "certificate-type",
            ChatStep::Name => "name",
            ChatStep::Cpf => "cpf",
            ChatStep::Address => "address",
            ChatStep::BuildingType => "building-type",
            ChatStep::Menu => "menu",
            ChatStep::Phone => "phone",
            ChatStep::VisitDate => "visit-date",
            ChatStep::VisitTime => "visit-time",
            ChatStep::MenuAfterVisit => "menu-after-visit",
            ChatStep::ProtocolNumber => "protocol-number",
            ChatStep::MenuAfterProtocol => "menu-after-protocol",
            ChatStep::PhoneForContact => "phone-for-contact",
            ChatStep::ContactReason => "contact-reason",
            ChatStep::ContactTime => "contact-time",
            ChatStep::MenuAfterContact => "menu-after-contact",
        }
    }
}

impl fmt::Display for ChatStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Session data
// ============================================================================

/// Fields collected so far. Each one is written only by the step that asks
/// for it; reducers return a new value instead of mutating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub certificate_type: String,
    pub name: String,
    pub cpf: String,
    pub address: String,
    pub building_type: String,
    pub phone: String,
    pub visit_date: String,
    pub visit_time: String,
    pub protocol_number: String,
    pub contact_reason: String,
}

impl SessionData {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_certificate_type(&self, value: impl Into<String>) -> Self {
        Self {
            certificate_type: value.into(),
            ..self.clone()
        }
    }

    pub fn with_name(&self, value: impl Into<String>) -> Self {
        Self {
            name: value.into(),
            ..self.clone()
        }
    }

    pub fn with_cpf(&self, value: impl Into<String>) -> Self {
        Self {
            cpf: value.into(),
            ..self.clone()
        }
    }

    pub fn with_address(&self, value: impl Into<String>) -> Self {
        Self {
            address: value.into(),
            ..self.clone()
        }
    }

    pub fn with_building_type(&self, value: impl Into<String>) -> Self {
        Self {
            building_type: value.into(),
            ..self.clone()
        }
    }

    pub fn with_phone(&self, value: impl Into<String>) -> Self {
        Self {
            phone: value.into(),
            ..self.clone()
        }
    }

    pub fn with_visit_date(&self, value: impl Into<String>) -> Self {
        Self {
            visit_date: value.into(),
            ..self.clone()
        }
    }

    pub fn with_visit_time(&self, value: impl Into<String>) -> Self {
        Self {
            visit_time: value.into(),
            ..self.clone()
        }
    }

    pub fn with_protocol_number(&self, value: impl Into<String>) -> Self {
        Self {
            protocol_number: value.into(),
            ..self.clone()
        }
    }

    pub fn with_contact_reason(&self, value: impl Into<String>) -> Self {
        Self {
            contact_reason: value.into(),
            ..self.clone()
        }
    }
}

// ============================================================================
// Chat state
// ============================================================================

/// Current step plus everything collected on the way there
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatState {
    pub step: ChatStep,
    pub session: SessionData,
}

impl ChatState {
    pub fn new(step: ChatStep, session: SessionData) -> Self {
        Self { step, session }
    }

    /// Fresh conversation at `step` with nothing collected
    pub fn at(step: ChatStep) -> Self {
        Self::new(step, SessionData::default())
    }
}

/// A bot turn: text plus the options it offers, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotPrompt {
    pub text: String,
    pub options: Option<Vec<String>>,
}

impl BotPrompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: None,
        }
    }

    pub fn with_options(text: impl Into<String>, options: &[&str]) -> Self {
        Self {
            text: text.into(),
            options: Some(options.iter().map(|o| (*o).to_string()).collect()),
        }
    }
}

/// Context for a chat session (immutable configuration)
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub session_id: String,
    pub protocols: Arc<dyn ProtocolSource>,
}

impl ChatContext {
    pub fn new(session_id: impl Into<String>, protocols: Arc<dyn ProtocolSource>) -> Self {
        Self {
            session_id: session_id.into(),
            protocols,
        }
    }
}
