//! Pure state transition function
//!
//! Given the same state, context and event this always yields the same
//! result (protocol numbers come from the context's source). Invalid input
//! never changes state.

use super::script::{
    self, AFTER_PROTOCOL_OPTIONS, AFTER_VISIT_OPTIONS, BACK_TO_MENU, BACK_TO_START,
    BUILDING_TYPES, CERTIFICATE_TYPES, CONTACT_TIMES, LATE_MENU_FALLBACK_OPTIONS,
    LOOKUP_PROTOCOL, MENU_FALLBACK_OPTIONS, MENU_OPTIONS, NEW_CERTIFICATE, SCHEDULE_VISIT,
    TALK_TO_AGENT, VISIT_TIMES,
};
use super::{BotPrompt, ChatContext, ChatState, ChatStep, Effect, Event, SessionData};
use crate::navigation::ChatAction;
use crate::protocol::ProtocolNumber;
use crate::validation::{digits_of, format_cpf, format_phone, InvalidInput};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// The last bot message this transition posts, if any
    #[cfg(test)]
    pub fn prompt(&self) -> Option<&BotPrompt> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::PostBotMessage { prompt, .. } => Some(prompt),
            _ => None,
        })
    }
}

/// Reasons an event is refused. The state stays where it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Validator verdict, message shown verbatim
    #[error("{0}")]
    Rejected(#[from] InvalidInput),
    #[error("Empty input")]
    EmptyInput,
    #[error("Step {0} expects one of the offered options")]
    ExpectsChoice(ChatStep),
    #[error("Step {0} expects typed text")]
    ExpectsText(ChatStep),
}

fn greeting() -> BotPrompt {
    BotPrompt::with_options(script::GREETING, CERTIFICATE_TYPES)
}

/// Starting state and first message for an initial action
pub fn opening(action: ChatAction) -> (ChatState, BotPrompt) {
    match action {
        ChatAction::Certificates => (ChatState::at(ChatStep::CertificateType), greeting()),
        ChatAction::ProtocolLookup => (
            ChatState::at(ChatStep::ProtocolNumber),
            BotPrompt::text(script::ASK_PROTOCOL),
        ),
        ChatAction::ContactRequest => (
            ChatState::at(ChatStep::PhoneForContact),
            BotPrompt::text(script::ASK_CONTACT_PHONE),
        ),
    }
}

/// Pure transition function
pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::Begin(action) => {
            let (next, prompt) = opening(action);
            Ok(TransitionResult::new(next)
                .with_effect(Effect::ClearTranscript)
                .with_effect(Effect::announce(prompt)))
        }
        Event::Text(text) => on_text(state, &text),
        Event::Choice(label) => on_choice(state, context, &label),
    }
}

/// Echo the user's turn, then reply after the typing delay
fn advance(next: ChatState, echo: &str, prompt: BotPrompt) -> TransitionResult {
    TransitionResult::new(next)
        .with_effect(Effect::user(echo))
        .with_effect(Effect::reply(prompt))
}

// ============================================================================
// Free text
// ============================================================================

fn on_text(state: &ChatState, text: &str) -> Result<TransitionResult, TransitionError> {
    let Some(rule) = state.step.text_rule() else {
        return Err(TransitionError::ExpectsChoice(state.step));
    };
    let value = text.trim();
    if value.is_empty() {
        return Err(TransitionError::EmptyInput);
    }
    rule.check(value)?;

    let session = &state.session;
    let (next, prompt) = match state.step {
        ChatStep::Name => (
            ChatState::new(ChatStep::Cpf, session.with_name(value)),
            BotPrompt::text(script::ASK_CPF),
        ),
        ChatStep::Cpf => (
            ChatState::new(ChatStep::Address, session.with_cpf(format_cpf(value))),
            BotPrompt::text(script::ASK_ADDRESS),
        ),
        ChatStep::Address => (
            ChatState::new(ChatStep::BuildingType, session.with_address(value)),
            BotPrompt::with_options(script::ASK_BUILDING_TYPE, BUILDING_TYPES),
        ),
        ChatStep::Phone => (
            ChatState::new(ChatStep::VisitDate, session.with_phone(format_phone(value))),
            BotPrompt::text(script::ASK_VISIT_DATE),
        ),
        ChatStep::PhoneForContact => (
            ChatState::new(ChatStep::ContactReason, session.with_phone(format_phone(value))),
            BotPrompt::text(script::ASK_CONTACT_REASON),
        ),
        ChatStep::VisitDate => (
            ChatState::new(ChatStep::VisitTime, session.with_visit_date(value)),
            BotPrompt::with_options(script::ASK_VISIT_TIME, VISIT_TIMES),
        ),
        ChatStep::ProtocolNumber => {
            let session = session.with_protocol_number(normalize_protocol(value));
            let details = script::protocol_details(&session);
            (
                ChatState::new(ChatStep::MenuAfterProtocol, session),
                BotPrompt::with_options(details, AFTER_PROTOCOL_OPTIONS),
            )
        }
        ChatStep::ContactReason => (
            ChatState::new(ChatStep::ContactTime, session.with_contact_reason(value)),
            BotPrompt::with_options(script::ASK_CONTACT_TIME, CONTACT_TIMES),
        ),
        ChatStep::CertificateType
        | ChatStep::BuildingType
        | ChatStep::Menu
        | ChatStep::VisitTime
        | ChatStep::MenuAfterVisit
        | ChatStep::MenuAfterProtocol
        | ChatStep::ContactTime
        | ChatStep::MenuAfterContact => return Err(TransitionError::ExpectsChoice(state.step)),
    };

    Ok(advance(next, value, prompt))
}

/// `cbmpe-0123456789`, `0123456789` and `CBMPE-0123456789` all name the same protocol
fn normalize_protocol(value: &str) -> String {
    ProtocolNumber::from_digits(&digits_of(value))
        .map_or_else(|| value.to_uppercase(), |number| number.to_string())
}

// ============================================================================
// Option choices
// ============================================================================

fn on_choice(
    state: &ChatState,
    context: &ChatContext,
    label: &str,
) -> Result<TransitionResult, TransitionError> {
    let session = &state.session;
    let result = match state.step {
        ChatStep::CertificateType => advance(
            ChatState::new(ChatStep::Name, session.with_certificate_type(label)),
            label,
            BotPrompt::text(script::ASK_NAME),
        ),
        ChatStep::BuildingType => {
            let session = session.with_building_type(label);
            let protocol = context.protocols.issue();
            tracing::debug!(session_id = %context.session_id, protocol = %protocol, "Issued request protocol");
            let summary = script::request_summary(&session, &protocol);
            advance(
                ChatState::new(ChatStep::Menu, session),
                label,
                BotPrompt::with_options(summary, MENU_OPTIONS),
            )
        }
        ChatStep::VisitTime => {
            let session = session.with_visit_time(label);
            let original = context.protocols.issue();
            let scheduling = context.protocols.issue();
            let summary = script::visit_summary(&session, &original, &scheduling);
            advance(
                ChatState::new(ChatStep::MenuAfterVisit, session),
                label,
                BotPrompt::with_options(summary, AFTER_VISIT_OPTIONS),
            )
        }
        ChatStep::ContactTime => advance(
            ChatState::new(ChatStep::MenuAfterContact, session.clone()),
            label,
            BotPrompt::with_options(
                script::contact_confirmation(session, label),
                AFTER_VISIT_OPTIONS,
            ),
        ),
        ChatStep::Menu
        | ChatStep::MenuAfterVisit
        | ChatStep::MenuAfterProtocol
        | ChatStep::MenuAfterContact => menu_choice(state.step, session, label),
        ChatStep::Name
        | ChatStep::Cpf
        | ChatStep::Address
        | ChatStep::Phone
        | ChatStep::VisitDate
        | ChatStep::ProtocolNumber
        | ChatStep::PhoneForContact
        | ChatStep::ContactReason => return Err(TransitionError::ExpectsText(state.step)),
    };
    Ok(result)
}

/// The closing menus. Unknown labels fall through to a reduced menu.
fn menu_choice(step: ChatStep, session: &SessionData, label: &str) -> TransitionResult {
    let first_menu = step == ChatStep::Menu;
    match label {
        NEW_CERTIFICATE => advance(ChatState::default(), label, greeting()),
        BACK_TO_START if !first_menu => TransitionResult::new(ChatState::default())
            .with_effect(Effect::ClearTranscript)
            .with_effect(Effect::announce(greeting())),
        SCHEDULE_VISIT if first_menu => advance(
            ChatState::new(ChatStep::Phone, session.clone()),
            label,
            BotPrompt::text(script::ASK_VISIT_PHONE),
        ),
        LOOKUP_PROTOCOL if step != ChatStep::MenuAfterProtocol => advance(
            ChatState::new(ChatStep::ProtocolNumber, session.clone()),
            label,
            BotPrompt::text(script::ASK_PROTOCOL),
        ),
        TALK_TO_AGENT if matches!(step, ChatStep::Menu | ChatStep::MenuAfterProtocol) => {
            if session.phone.is_empty() {
                advance(
                    ChatState::new(ChatStep::PhoneForContact, session.clone()),
                    label,
                    BotPrompt::text(script::ASK_CONTACT_PHONE),
                )
            } else {
                advance(
                    ChatState::new(ChatStep::ContactReason, session.clone()),
                    label,
                    BotPrompt::text(script::ASK_CONTACT_REASON),
                )
            }
        }
        BACK_TO_MENU if first_menu => advance(
            ChatState::new(step, session.clone()),
            label,
            BotPrompt::with_options(script::HOW_CAN_I_HELP, MENU_OPTIONS),
        ),
        _ => {
            let reduced = if first_menu {
                MENU_FALLBACK_OPTIONS
            } else {
                LATE_MENU_FALLBACK_OPTIONS
            };
            advance(
                ChatState::new(step, session.clone()),
                label,
                BotPrompt::with_options(script::NOT_AVAILABLE, reduced),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ProtocolSource, SeededProtocolSource};
    use std::sync::Arc;

    const SEED: u64 = 42;

    fn test_context() -> ChatContext {
        ChatContext::new("test-session", Arc::new(SeededProtocolSource::new(SEED)))
    }

    fn step(state: &ChatState, event: Event) -> TransitionResult {
        transition(state, &test_context(), event).unwrap()
    }

    fn filled_session() -> SessionData {
        SessionData::default()
            .with_certificate_type(CERTIFICATE_TYPES[0])
            .with_name("Ana Souza")
            .with_cpf("111.444.777-35")
            .with_address("Rua A, 100")
            .with_building_type("Residencial")
    }

    #[test]
    fn test_certificate_choice_asks_for_name() {
        let result = step(&ChatState::default(), Event::choice(CERTIFICATE_TYPES[1]));

        assert_eq!(result.new_state.step, ChatStep::Name);
        assert_eq!(result.new_state.session.certificate_type, CERTIFICATE_TYPES[1]);
        assert_eq!(result.prompt().unwrap().text, script::ASK_NAME);
        assert_eq!(result.effects[0], Effect::user(CERTIFICATE_TYPES[1]));
    }

    #[test]
    fn test_invalid_text_keeps_step_and_surfaces_message() {
        let state = ChatState::at(ChatStep::Cpf);
        let err = transition(&state, &test_context(), Event::text("11144477736")).unwrap_err();

        assert_eq!(err.to_string(), "CPF inválido.");
        assert!(matches!(err, TransitionError::Rejected(_)));
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let state = ChatState::at(ChatStep::Name);
        let err = transition(&state, &test_context(), Event::text("   ")).unwrap_err();
        assert_eq!(err, TransitionError::EmptyInput);
    }

    #[test]
    fn test_input_kind_mismatch() {
        let err = transition(
            &ChatState::at(ChatStep::BuildingType),
            &test_context(),
            Event::text("Residencial"),
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::ExpectsChoice(ChatStep::BuildingType));

        let err = transition(
            &ChatState::at(ChatStep::Name),
            &test_context(),
            Event::choice("Ana Souza"),
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::ExpectsText(ChatStep::Name));
    }

    #[test]
    fn test_certificate_request_end_to_end() {
        let mut state = step(&ChatState::default(), Event::choice(CERTIFICATE_TYPES[0])).new_state;

        let result = step(&state, Event::text("Ana Souza"));
        assert_eq!(result.new_state.step, ChatStep::Cpf);
        state = result.new_state;

        let result = step(&state, Event::text("111.444.777-35"));
        assert_eq!(result.new_state.session.cpf, "111.444.777-35");
        assert_eq!(result.new_state.step, ChatStep::Address);
        state = result.new_state;

        let result = step(&state, Event::text("Rua A, 100"));
        assert_eq!(result.new_state.step, ChatStep::BuildingType);
        assert_eq!(
            result.prompt().unwrap().options.as_deref().unwrap().len(),
            BUILDING_TYPES.len()
        );
        state = result.new_state;

        let result = step(&state, Event::choice("Residencial"));
        let expected_protocol = SeededProtocolSource::new(SEED).issue();
        let summary = result.prompt().unwrap();
        for field in [
            CERTIFICATE_TYPES[0],
            "Ana Souza",
            "111.444.777-35",
            "Rua A, 100",
            "Residencial",
            &expected_protocol.to_string(),
        ] {
            assert!(summary.text.contains(field), "summary is missing {field}");
        }
        assert_eq!(result.new_state.step, ChatStep::Menu);
        assert_eq!(summary.options.as_deref().unwrap(), MENU_OPTIONS);
    }

    #[test]
    fn test_unformatted_cpf_is_stored_formatted() {
        let result = step(&ChatState::at(ChatStep::Cpf), Event::text("11144477735"));
        assert_eq!(result.new_state.session.cpf, "111.444.777-35");
    }

    #[test]
    fn test_new_certificate_resets_from_every_menu() {
        for menu in [
            ChatStep::Menu,
            ChatStep::MenuAfterVisit,
            ChatStep::MenuAfterProtocol,
            ChatStep::MenuAfterContact,
        ] {
            let state = ChatState::new(menu, filled_session());
            let result = step(&state, Event::choice(NEW_CERTIFICATE));

            assert_eq!(result.new_state, ChatState::default(), "from {menu}");
            let prompt = result.prompt().unwrap();
            assert_eq!(prompt.text, script::GREETING);
            assert_eq!(prompt.options.as_deref().unwrap(), CERTIFICATE_TYPES);
        }
    }

    #[test]
    fn test_back_to_start_clears_transcript() {
        let state = ChatState::new(ChatStep::MenuAfterVisit, filled_session());
        let result = step(&state, Event::choice(BACK_TO_START));

        assert_eq!(result.new_state, ChatState::default());
        assert_eq!(result.effects[0], Effect::ClearTranscript);
        assert_eq!(result.prompt().unwrap().text, script::GREETING);
    }

    #[test]
    fn test_unknown_menu_choice_offers_reduced_menu() {
        let state = ChatState::new(ChatStep::Menu, filled_session());
        let result = step(&state, Event::choice("Emitir segunda via"));
        assert_eq!(result.new_state, state);
        let prompt = result.prompt().unwrap();
        assert_eq!(prompt.text, script::NOT_AVAILABLE);
        assert_eq!(prompt.options.as_deref().unwrap(), MENU_FALLBACK_OPTIONS);

        let state = ChatState::new(ChatStep::MenuAfterProtocol, filled_session());
        let result = step(&state, Event::choice(LOOKUP_PROTOCOL));
        assert_eq!(result.new_state, state);
        assert_eq!(
            result.prompt().unwrap().options.as_deref().unwrap(),
            LATE_MENU_FALLBACK_OPTIONS
        );
    }

    #[test]
    fn test_back_to_menu_reoffers_full_menu() {
        let state = ChatState::new(ChatStep::Menu, filled_session());
        let result = step(&state, Event::choice(BACK_TO_MENU));
        assert_eq!(result.new_state, state);
        let prompt = result.prompt().unwrap();
        assert_eq!(prompt.text, script::HOW_CAN_I_HELP);
        assert_eq!(prompt.options.as_deref().unwrap(), MENU_OPTIONS);
    }

    #[test]
    fn test_talk_to_agent_skips_phone_when_known() {
        let state = ChatState::new(ChatStep::Menu, filled_session());
        let result = step(&state, Event::choice(TALK_TO_AGENT));
        assert_eq!(result.new_state.step, ChatStep::PhoneForContact);

        let state = ChatState::new(
            ChatStep::MenuAfterProtocol,
            filled_session().with_phone("(81) 98765-4321"),
        );
        let result = step(&state, Event::choice(TALK_TO_AGENT));
        assert_eq!(result.new_state.step, ChatStep::ContactReason);
    }

    #[test]
    fn test_visit_scheduling_flow() {
        let state = ChatState::new(ChatStep::Menu, filled_session());
        let state = step(&state, Event::choice(SCHEDULE_VISIT)).new_state;
        assert_eq!(state.step, ChatStep::Phone);

        let state = step(&state, Event::text("81987654321")).new_state;
        assert_eq!(state.session.phone, "(81) 98765-4321");
        assert_eq!(state.step, ChatStep::VisitDate);

        let state = step(&state, Event::text("25/12/2024")).new_state;
        assert_eq!(state.step, ChatStep::VisitTime);

        let result = step(&state, Event::choice(VISIT_TIMES[2]));
        assert_eq!(result.new_state.step, ChatStep::MenuAfterVisit);
        let text = &result.prompt().unwrap().text;
        assert!(text.contains("Vistoria agendada com sucesso!"));
        assert!(text.contains("25/12/2024"));
        assert!(text.contains(VISIT_TIMES[2]));
        assert_eq!(text.matches("CBMPE-").count(), 2);
    }

    #[test]
    fn test_protocol_lookup_normalizes_number() {
        let result = step(
            &ChatState::at(ChatStep::ProtocolNumber),
            Event::text("cbmpe-0123456789"),
        );
        assert_eq!(result.new_state.step, ChatStep::MenuAfterProtocol);
        assert_eq!(result.new_state.session.protocol_number, "CBMPE-0123456789");
        assert!(result
            .prompt()
            .unwrap()
            .text
            .starts_with("🔍 Detalhes do protocolo CBMPE-0123456789:"));
    }

    #[test]
    fn test_contact_request_flow() {
        let state = step(
            &ChatState::default(),
            Event::Begin(ChatAction::ContactRequest),
        )
        .new_state;
        assert_eq!(state.step, ChatStep::PhoneForContact);

        let state = step(&state, Event::text("8134567890")).new_state;
        assert_eq!(state.session.phone, "(81) 3456-7890");

        let state = step(&state, Event::text("Preciso remarcar a vistoria")).new_state;
        assert_eq!(state.step, ChatStep::ContactTime);

        let result = step(&state, Event::choice(CONTACT_TIMES[0]));
        assert_eq!(result.new_state.step, ChatStep::MenuAfterContact);
        let text = &result.prompt().unwrap().text;
        assert!(text.contains("Melhor horário para contato: Manhã (8h-12h)"));
        assert!(text.contains("Motivo do contato: Preciso remarcar a vistoria"));
    }

    #[test]
    fn test_begin_seeds_each_action() {
        let filled = ChatState::new(ChatStep::Menu, filled_session());
        for (action, expected) in [
            (ChatAction::Certificates, ChatStep::CertificateType),
            (ChatAction::ProtocolLookup, ChatStep::ProtocolNumber),
            (ChatAction::ContactRequest, ChatStep::PhoneForContact),
        ] {
            let result = step(&filled, Event::Begin(action));
            assert_eq!(result.new_state, ChatState::at(expected));
            assert_eq!(result.effects[0], Effect::ClearTranscript);
            assert!(matches!(
                result.effects[1],
                Effect::PostBotMessage { typing: false, .. }
            ));
        }
    }
}
