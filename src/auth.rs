//! Login, registration and password-reset forms
//!
//! There is no account backend. Submitting a valid form starts a simulated
//! processing delay, after which `AuthRequest::outcome` says where to go.

use crate::navigation::Screen;
use crate::validation::{
    validate_account_name, validate_account_phone, validate_cpf, validate_email,
    validate_login_password, validate_new_password, Field, InvalidInput, Verdict,
};
use std::collections::BTreeMap;

/// Field-level messages for a form, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    by_field: BTreeMap<Field, &'static str>,
}

impl FormErrors {
    fn record(&mut self, verdict: Verdict) {
        if let Some(InvalidInput { field, message }) = verdict.err() {
            self.by_field.entry(field).or_insert(message);
        }
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.by_field.get(&field).copied()
    }

    /// Editing a field clears its message
    pub fn clear(&mut self, field: Field) {
        self.by_field.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.record(validate_email(&self.email));
        errors.record(validate_login_password(&self.password));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.record(validate_account_name(&self.name));
        errors.record(validate_cpf(&self.cpf));
        errors.record(validate_email(&self.email));
        errors.record(validate_account_phone(&self.phone));
        errors.record(validate_new_password(&self.password));
        if self.password != self.confirm_password {
            errors.record(Err(InvalidInput::new(
                Field::ConfirmPassword,
                "As senhas não coincidem.",
            )));
        }
        if !self.accepted_terms {
            errors.record(Err(InvalidInput::new(
                Field::Terms,
                "Você deve aceitar os termos.",
            )));
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordResetForm {
    pub email: String,
}

impl PasswordResetForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.record(validate_email(&self.email));
        errors.into_result()
    }
}

/// A submission waiting on the processing delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequest {
    Login,
    /// gov.br single sign-on; skips form validation
    GovBrLogin,
    Register,
    SendResetLink,
    ResendResetLink,
}

/// What happens once processing finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Navigate(Screen),
    /// Show the "email sent" view
    ResetLinkSent,
    /// Nothing changes on screen
    Done,
}

impl AuthRequest {
    pub fn outcome(self) -> AuthOutcome {
        match self {
            AuthRequest::Login | AuthRequest::GovBrLogin => AuthOutcome::Navigate(Screen::Chat),
            AuthRequest::Register => AuthOutcome::Navigate(Screen::Login),
            AuthRequest::SendResetLink => AuthOutcome::ResetLinkSent,
            AuthRequest::ResendResetLink => AuthOutcome::Done,
        }
    }

    /// Button label while processing
    pub fn busy_label(self) -> &'static str {
        match self {
            AuthRequest::Login | AuthRequest::GovBrLogin => "Entrando...",
            AuthRequest::Register => "Cadastrando...",
            AuthRequest::SendResetLink => "Enviando...",
            AuthRequest::ResendResetLink => "Reenviando...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterForm {
        RegisterForm {
            name: "Ana Souza".to_string(),
            cpf: "111.444.777-35".to_string(),
            email: "ana@example.com".to_string(),
            phone: "(81) 98765-4321".to_string(),
            password: "Segura123".to_string(),
            confirm_password: "Segura123".to_string(),
            accepted_terms: true,
        }
    }

    #[test]
    fn test_login_reports_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.get(Field::Email), Some("Email inválido."));
        assert_eq!(
            errors.get(Field::Password),
            Some("Senha deve ter no mínimo 6 caracteres.")
        );

        let form = LoginForm {
            email: "ana@example.com".to_string(),
            password: "123456".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_registration_accepts_valid_form() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn test_registration_collects_every_error() {
        let form = RegisterForm {
            name: "Al".to_string(),
            cpf: "111.111.111-11".to_string(),
            email: "ana@".to_string(),
            phone: "8198".to_string(),
            password: "segura123".to_string(),
            confirm_password: "outra".to_string(),
            accepted_terms: false,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 7);
        assert_eq!(
            errors.get(Field::Password),
            Some("Senha deve conter maiúsculas, minúsculas e números.")
        );
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            Some("As senhas não coincidem.")
        );
        assert_eq!(errors.get(Field::Terms), Some("Você deve aceitar os termos."));
        assert_eq!(errors.get(Field::Phone), Some("Telefone inválido."));
    }

    #[test]
    fn test_clearing_a_field_error() {
        let mut errors = RegisterForm {
            accepted_terms: false,
            ..valid_registration()
        }
        .validate()
        .unwrap_err();
        errors.clear(Field::Terms);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_password_reset() {
        assert!(PasswordResetForm::default().validate().is_err());
        let form = PasswordResetForm {
            email: "ana@example.com".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_outcomes() {
        assert_eq!(
            AuthRequest::GovBrLogin.outcome(),
            AuthOutcome::Navigate(Screen::Chat)
        );
        assert_eq!(
            AuthRequest::Register.outcome(),
            AuthOutcome::Navigate(Screen::Login)
        );
        assert_eq!(AuthRequest::SendResetLink.outcome(), AuthOutcome::ResetLinkSent);
        assert_eq!(AuthRequest::ResendResetLink.outcome(), AuthOutcome::Done);
    }
}
