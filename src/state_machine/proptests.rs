//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::script::{self, BACK_TO_START, NEW_CERTIFICATE};
use super::state::StepInput;
use super::*;
use crate::navigation::ChatAction;
use crate::protocol::SeededProtocolSource;
use crate::validation::TextRule;
use proptest::prelude::*;
use regex::Regex;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context(seed: u64) -> ChatContext {
    ChatContext::new("prop-session", Arc::new(SeededProtocolSource::new(seed)))
}

/// Input that passes each free-text rule
fn valid_text(rule: TextRule) -> &'static str {
    match rule {
        TextRule::Name => "Ana Souza",
        TextRule::Cpf => "111.444.777-35",
        TextRule::Address => "Rua A, 100",
        TextRule::Phone => "81987654321",
        TextRule::Date => "25/12/2024",
        TextRule::Protocol => "0123456789",
        TextRule::ContactReason => "Preciso remarcar a vistoria",
    }
}

/// The session field a step is allowed to write
fn owned_field(step: ChatStep) -> Option<&'static str> {
    match step {
        ChatStep::CertificateType => Some("certificate_type"),
        ChatStep::Name => Some("name"),
        ChatStep::Cpf => Some("cpf"),
        ChatStep::Address => Some("address"),
        ChatStep::BuildingType => Some("building_type"),
        ChatStep::Phone | ChatStep::PhoneForContact => Some("phone"),
        ChatStep::VisitDate => Some("visit_date"),
        ChatStep::VisitTime => Some("visit_time"),
        ChatStep::ProtocolNumber => Some("protocol_number"),
        ChatStep::ContactReason => Some("contact_reason"),
        ChatStep::Menu
        | ChatStep::MenuAfterVisit
        | ChatStep::MenuAfterProtocol
        | ChatStep::ContactTime
        | ChatStep::MenuAfterContact => None,
    }
}

fn changed_fields(before: &SessionData, after: &SessionData) -> Vec<&'static str> {
    let pairs = [
        ("certificate_type", &before.certificate_type, &after.certificate_type),
        ("name", &before.name, &after.name),
        ("cpf", &before.cpf, &after.cpf),
        ("address", &before.address, &after.address),
        ("building_type", &before.building_type, &after.building_type),
        ("phone", &before.phone, &after.phone),
        ("visit_date", &before.visit_date, &after.visit_date),
        ("visit_time", &before.visit_time, &after.visit_time),
        ("protocol_number", &before.protocol_number, &after.protocol_number),
        ("contact_reason", &before.contact_reason, &after.contact_reason),
    ];
    pairs
        .into_iter()
        .filter(|(_, a, b)| a != b)
        .map(|(name, _, _)| name)
        .collect()
}

fn step_options(step: ChatStep) -> &'static [&'static str] {
    match step.input() {
        StepInput::Choice(options) => options,
        StepInput::FreeText(_) => &[],
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_step() -> impl Strategy<Value = ChatStep> {
    proptest::sample::select(ChatStep::ALL.to_vec())
}

fn arb_menu_step() -> impl Strategy<Value = ChatStep> {
    proptest::sample::select(
        ChatStep::ALL
            .iter()
            .copied()
            .filter(|step| step.is_menu())
            .collect::<Vec<_>>(),
    )
}

fn arb_session() -> impl Strategy<Value = SessionData> {
    (
        "[A-Za-z ]{0,12}",
        "[A-Za-z ]{0,12}",
        "[0-9().-]{0,14}",
        proptest::option::of("[0-9() -]{10,15}"),
    )
        .prop_map(|(certificate_type, name, cpf, phone)| SessionData {
            certificate_type,
            name,
            cpf,
            phone: phone.unwrap_or_default(),
            ..SessionData::default()
        })
}

fn arb_state() -> impl Strategy<Value = ChatState> {
    (arb_step(), arb_session()).prop_map(|(step, session)| ChatState::new(step, session))
}

fn arb_action() -> impl Strategy<Value = ChatAction> {
    prop_oneof![
        Just(ChatAction::Certificates),
        Just(ChatAction::ProtocolLookup),
        Just(ChatAction::ContactRequest),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    let known_label = proptest::sample::select(
        ChatStep::ALL
            .iter()
            .flat_map(|step| step_options(*step).iter().copied())
            .collect::<Vec<_>>(),
    );
    prop_oneof![
        arb_action().prop_map(Event::Begin),
        "[ -~À-ÿ]{0,40}".prop_map(Event::Text),
        known_label.prop_map(Event::choice),
        "[A-Za-z ]{1,20}".prop_map(Event::Choice),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn rejected_text_matches_validator(state in arb_state(), text in "[ -~À-ÿ]{0,30}") {
        let Some(rule) = state.step.text_rule() else {
            return Ok(());
        };
        let result = transition(&state, &test_context(1), Event::text(text.clone()));
        let trimmed = text.trim();
        if trimmed.is_empty() {
            prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyInput);
        } else if let Err(invalid) = rule.check(trimmed) {
            prop_assert_eq!(result.unwrap_err(), TransitionError::Rejected(invalid));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn input_kind_is_enforced(state in arb_state(), value in "[A-Za-z ]{1,20}") {
        let ctx = test_context(1);
        if state.step.accepts_text() {
            prop_assert_eq!(
                transition(&state, &ctx, Event::choice(value)).unwrap_err(),
                TransitionError::ExpectsText(state.step)
            );
        } else {
            prop_assert_eq!(
                transition(&state, &ctx, Event::text(value)).unwrap_err(),
                TransitionError::ExpectsChoice(state.step)
            );
        }
    }

    #[test]
    fn fields_are_written_only_by_their_step(state in arb_state(), event in arb_event()) {
        let resetting = match &event {
            Event::Begin(_) => true,
            Event::Choice(label) if state.step.is_menu() => {
                label == NEW_CERTIFICATE
                    || (label == BACK_TO_START && state.step != ChatStep::Menu)
            }
            _ => false,
        };
        let Ok(result) = transition(&state, &test_context(1), event) else {
            return Ok(());
        };
        if resetting {
            prop_assert!(result.new_state.session.is_empty());
            return Ok(());
        }
        let changed = changed_fields(&state.session, &result.new_state.session);
        let allowed: Vec<_> = owned_field(state.step).into_iter().collect();
        for field in changed {
            prop_assert!(allowed.contains(&field), "{} wrote {}", state.step, field);
        }
    }

    #[test]
    fn prompts_fit_the_next_step(state in arb_state(), event in arb_event()) {
        let Ok(result) = transition(&state, &test_context(1), event) else {
            return Ok(());
        };
        let next = result.new_state.step;
        let prompt = result.prompt().expect("every transition posts a prompt");
        match next.input() {
            StepInput::FreeText(_) => prop_assert!(prompt.options.is_none()),
            StepInput::Choice(options) if !next.is_menu() => {
                prop_assert_eq!(prompt.options.as_deref().unwrap(), options);
            }
            StepInput::Choice(_) => {
                prop_assert!(!prompt.options.as_deref().unwrap_or_default().is_empty());
            }
        }
    }

    #[test]
    fn summaries_carry_well_formed_protocols(
        session in arb_session(),
        building in proptest::sample::select(script::BUILDING_TYPES.to_vec()),
        seed in any::<u64>(),
    ) {
        let state = ChatState::new(ChatStep::BuildingType, session);
        let result = transition(&state, &test_context(seed), Event::choice(building)).unwrap();
        let pattern = Regex::new(r"Número do protocolo: CBMPE-[0-9]{10}\n").unwrap();
        prop_assert!(pattern.is_match(&result.prompt().unwrap().text));
    }

    #[test]
    fn new_certificate_resets_any_menu(step in arb_menu_step(), session in arb_session()) {
        let state = ChatState::new(step, session);
        let result = transition(&state, &test_context(1), Event::choice(NEW_CERTIFICATE)).unwrap();
        prop_assert_eq!(&result.new_state, &ChatState::default());
        let prompt = result.prompt().unwrap();
        prop_assert_eq!(prompt.text.as_str(), script::GREETING);
        prop_assert_eq!(prompt.options.as_deref().unwrap(), script::CERTIFICATE_TYPES);
    }

    #[test]
    fn unknown_menu_labels_keep_state(
        step in arb_menu_step(),
        session in arb_session(),
        label in "[a-z]{3,12} [a-z]{3,12}",
    ) {
        let state = ChatState::new(step, session);
        let result = transition(&state, &test_context(1), Event::choice(label)).unwrap();
        prop_assert_eq!(&result.new_state, &state);
        prop_assert_eq!(result.prompt().unwrap().text.as_str(), script::NOT_AVAILABLE);
    }

    #[test]
    fn begin_always_starts_clean(state in arb_state(), action in arb_action()) {
        let result = transition(&state, &test_context(1), Event::Begin(action)).unwrap();
        prop_assert_eq!(&result.effects[0], &Effect::ClearTranscript);
        prop_assert!(result.new_state.session.is_empty());
        prop_assert_eq!(result.new_state, opening(action).0);
    }

    /// Following only offered options and valid text never dead-ends
    #[test]
    fn scripted_walk_never_dead_ends(picks in proptest::collection::vec(0usize..8, 1..40)) {
        let ctx = test_context(9);
        let mut state = ChatState::default();
        for pick in picks {
            let event = match state.step.input() {
                StepInput::FreeText(rule) => Event::text(valid_text(rule)),
                StepInput::Choice(options) => Event::choice(options[pick % options.len()]),
            };
            let result = transition(&state, &ctx, event).unwrap();
            prop_assert_ne!(result.prompt().unwrap().text.as_str(), script::NOT_AVAILABLE);
            state = result.new_state;
        }
    }
}
