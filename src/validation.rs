//! Field validators and presentation formatters
//!
//! Every validator is a pure function from raw text to a verdict. Formatters
//! only run on input that already passed validation.

#[cfg(test)]
mod proptests;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\x{00C0}-\x{00FF}\s]+$").unwrap());

/// `DD/MM/AAAA` shape only
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").unwrap());

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Which input a verdict refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Cpf,
    Name,
    Address,
    Phone,
    Date,
    Protocol,
    ContactReason,
    Email,
    Password,
    ConfirmPassword,
    Terms,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Cpf => "cpf",
            Field::Name => "name",
            Field::Address => "address",
            Field::Phone => "phone",
            Field::Date => "date",
            Field::Protocol => "protocol",
            Field::ContactReason => "contact_reason",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm_password",
            Field::Terms => "terms",
        };
        f.write_str(name)
    }
}

/// A failed validation. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvalidInput {
    pub field: Field,
    pub message: &'static str,
}

impl InvalidInput {
    pub fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

pub type Verdict = Result<(), InvalidInput>;

/// Free-text validators used by the chat steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRule {
    Name,
    Cpf,
    Address,
    Phone,
    Date,
    Protocol,
    ContactReason,
}

impl TextRule {
    pub fn check(self, input: &str) -> Verdict {
        match self {
            TextRule::Name => validate_name(input),
            TextRule::Cpf => validate_cpf(input),
            TextRule::Address => validate_address(input),
            TextRule::Phone => validate_phone(input),
            TextRule::Date => validate_date(input),
            TextRule::Protocol => validate_protocol(input),
            TextRule::ContactReason => validate_contact_reason(input),
        }
    }

    /// Example shown in the empty input box
    pub fn placeholder(self) -> &'static str {
        match self {
            TextRule::Name => "Ex: João Silva Santos",
            TextRule::Cpf => "Ex: 000.000.000-00",
            TextRule::Address => "Ex: Rua das Flores, 123, Boa Vista, Recife-PE",
            TextRule::Phone => "Ex: (81) 98765-4321",
            TextRule::Date => "Ex: 25/12/2024",
            TextRule::Protocol | TextRule::ContactReason => "Digite sua mensagem...",
        }
    }
}

/// Keep only ASCII digits
pub fn digits_of(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ============================================================================
// Chat validators
// ============================================================================

pub fn validate_cpf(input: &str) -> Verdict {
    let digits: Vec<u32> = digits_of(input)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return Err(InvalidInput::new(Field::Cpf, "CPF deve conter 11 dígitos."));
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(InvalidInput::new(Field::Cpf, "CPF inválido."));
    }
    if cpf_check_digit(&digits[..9]) != digits[9] || cpf_check_digit(&digits[..10]) != digits[10] {
        return Err(InvalidInput::new(Field::Cpf, "CPF inválido."));
    }
    Ok(())
}

/// Weighted sum mod 11 over `prefix`, weights counting down to 2.
fn cpf_check_digit(prefix: &[u32]) -> u32 {
    let top = u32::try_from(prefix.len()).unwrap_or(0) + 1;
    let sum: u32 = prefix
        .iter()
        .zip((2..=top).rev())
        .map(|(d, w)| d * w)
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

pub fn validate_name(input: &str) -> Verdict {
    let trimmed = input.trim();
    if char_len(trimmed) < 3 {
        return Err(InvalidInput::new(
            Field::Name,
            "Nome deve ter pelo menos 3 caracteres.",
        ));
    }
    if !NAME_PATTERN.is_match(trimmed) {
        return Err(InvalidInput::new(
            Field::Name,
            "Nome deve conter apenas letras.",
        ));
    }
    if trimmed.split(' ').filter(|part| !part.is_empty()).count() < 2 {
        return Err(InvalidInput::new(
            Field::Name,
            "Por favor, informe nome e sobrenome.",
        ));
    }
    Ok(())
}

pub fn validate_address(input: &str) -> Verdict {
    let trimmed = input.trim();
    if char_len(trimmed) < 10 {
        return Err(InvalidInput::new(
            Field::Address,
            "Endereço deve ter pelo menos 10 caracteres.",
        ));
    }
    if !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Err(InvalidInput::new(
            Field::Address,
            "Endereço deve conter número.",
        ));
    }
    Ok(())
}

pub fn validate_phone(input: &str) -> Verdict {
    let count = digits_of(input).len();
    if !(10..=11).contains(&count) {
        return Err(InvalidInput::new(
            Field::Phone,
            "Telefone deve conter 10 ou 11 dígitos.",
        ));
    }
    Ok(())
}

/// Shape check only: `99/99/9999` passes.
pub fn validate_date(input: &str) -> Verdict {
    let trimmed = input.trim();
    if char_len(trimmed) < 10 {
        return Err(InvalidInput::new(
            Field::Date,
            "Data deve ter pelo menos 10 caracteres.",
        ));
    }
    if !DATE_PATTERN.is_match(trimmed) {
        return Err(InvalidInput::new(
            Field::Date,
            "Data deve estar no formato DD/MM/AAAA.",
        ));
    }
    Ok(())
}

pub fn validate_protocol(input: &str) -> Verdict {
    if digits_of(input).len() != 10 {
        return Err(InvalidInput::new(
            Field::Protocol,
            "Protocolo deve conter 10 dígitos.",
        ));
    }
    Ok(())
}

pub fn validate_contact_reason(input: &str) -> Verdict {
    if char_len(input.trim()) < 10 {
        return Err(InvalidInput::new(
            Field::ContactReason,
            "Por favor, descreva melhor sua necessidade (mínimo 10 caracteres).",
        ));
    }
    Ok(())
}

// ============================================================================
// Account form validators
// ============================================================================

pub fn validate_email(input: &str) -> Verdict {
    if !EMAIL_PATTERN.is_match(input) {
        return Err(InvalidInput::new(Field::Email, "Email inválido."));
    }
    Ok(())
}

pub fn validate_login_password(input: &str) -> Verdict {
    if char_len(input) < 6 {
        return Err(InvalidInput::new(
            Field::Password,
            "Senha deve ter no mínimo 6 caracteres.",
        ));
    }
    Ok(())
}

pub fn validate_new_password(input: &str) -> Verdict {
    if char_len(input) < 8 {
        return Err(InvalidInput::new(
            Field::Password,
            "Senha deve ter no mínimo 8 caracteres.",
        ));
    }
    let lower = input.chars().any(|c| c.is_ascii_lowercase());
    let upper = input.chars().any(|c| c.is_ascii_uppercase());
    let digit = input.chars().any(|c| c.is_ascii_digit());
    if !(lower && upper && digit) {
        return Err(InvalidInput::new(
            Field::Password,
            "Senha deve conter maiúsculas, minúsculas e números.",
        ));
    }
    Ok(())
}

pub fn validate_account_name(input: &str) -> Verdict {
    if char_len(input.trim()) < 3 {
        return Err(InvalidInput::new(
            Field::Name,
            "Nome deve ter pelo menos 3 caracteres.",
        ));
    }
    Ok(())
}

/// Same digit count as the chat's phone step, with the form's shorter message
pub fn validate_account_phone(input: &str) -> Verdict {
    validate_phone(input).map_err(|_| InvalidInput::new(Field::Phone, "Telefone inválido."))
}

// ============================================================================
// Formatters
// ============================================================================

fn group(digits: &[char], from: usize, to: usize) -> String {
    digits[from..to].iter().collect()
}

/// `###.###.###-##`; anything that is not 11 digits comes back as bare digits.
pub fn format_cpf(input: &str) -> String {
    let digits: Vec<char> = digits_of(input).chars().collect();
    if digits.len() != 11 {
        return digits.into_iter().collect();
    }
    format!(
        "{}.{}.{}-{}",
        group(&digits, 0, 3),
        group(&digits, 3, 6),
        group(&digits, 6, 9),
        group(&digits, 9, 11)
    )
}

/// `(##) ####-####` for landlines, `(##) #####-####` for mobiles.
pub fn format_phone(input: &str) -> String {
    let digits: Vec<char> = digits_of(input).chars().collect();
    match digits.len() {
        10 => format!(
            "({}) {}-{}",
            group(&digits, 0, 2),
            group(&digits, 2, 6),
            group(&digits, 6, 10)
        ),
        11 => format!(
            "({}) {}-{}",
            group(&digits, 0, 2),
            group(&digits, 2, 7),
            group(&digits, 7, 11)
        ),
        _ => digits.into_iter().collect(),
    }
}
