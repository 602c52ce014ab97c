//! Property-based tests for the field validators

use super::*;
use proptest::prelude::*;

/// Build a checksum-correct CPF from nine base digits.
fn complete_cpf(base: &[u32]) -> String {
    let mut digits = base.to_vec();
    digits.push(cpf_check_digit(&digits));
    digits.push(cpf_check_digit(&digits));
    digits.iter().map(|d| char::from_digit(*d, 10).unwrap()).collect()
}

proptest! {
    #[test]
    fn repeated_digit_cpf_is_invalid(d in 0u32..10) {
        let cpf = char::from_digit(d, 10).unwrap().to_string().repeat(11);
        prop_assert!(validate_cpf(&cpf).is_err());
    }

    #[test]
    fn computed_check_digits_validate(base in proptest::collection::vec(0u32..10, 9)) {
        prop_assume!(!base.iter().all(|d| *d == base[0]));
        let cpf = complete_cpf(&base);
        prop_assert!(validate_cpf(&cpf).is_ok(), "{} should be valid", cpf);
        prop_assert_eq!(format_cpf(&cpf).len(), 14);
    }

    #[test]
    fn corrupted_last_digit_is_invalid(
        base in proptest::collection::vec(0u32..10, 9),
        bump in 1u32..10,
    ) {
        let cpf = complete_cpf(&base);
        let mut chars: Vec<char> = cpf.chars().collect();
        let last = chars[10].to_digit(10).unwrap();
        chars[10] = char::from_digit((last + bump) % 10, 10).unwrap();
        let corrupted: String = chars.into_iter().collect();
        prop_assert!(validate_cpf(&corrupted).is_err());
    }

    #[test]
    fn punctuation_does_not_change_cpf_verdict(base in proptest::collection::vec(0u32..10, 9)) {
        let cpf = complete_cpf(&base);
        let formatted = format_cpf(&cpf);
        prop_assert_eq!(validate_cpf(&cpf).is_ok(), validate_cpf(&formatted).is_ok());
    }

    #[test]
    fn phone_verdict_depends_on_digit_count(digits in "[0-9]{1,14}", noise in "[ ()-]{0,4}") {
        let input = format!("{noise}{digits}");
        let expected = (10..=11).contains(&digits.len());
        prop_assert_eq!(validate_phone(&input).is_ok(), expected);
    }

    #[test]
    fn phone_formatter_keeps_every_digit(digits in "[0-9]{10,11}") {
        let formatted = format_phone(&digits);
        prop_assert_eq!(digits_of(&formatted), digits);
        prop_assert!(formatted.starts_with('('));
    }

    #[test]
    fn any_two_digit_groups_pass_date_shape(d in 0u32..100, m in 0u32..100, y in 0u32..10000) {
        let date = format!("{d:02}/{m:02}/{y:04}");
        prop_assert!(validate_date(&date).is_ok());
    }

    #[test]
    fn protocol_needs_exactly_ten_digits(digits in "[0-9]{0,14}") {
        let input = format!("CBMPE-{digits}");
        prop_assert_eq!(validate_protocol(&input).is_ok(), digits.len() == 10);
    }

    #[test]
    fn two_word_letter_names_are_valid(first in "[A-Za-zÀ-ÿ]{2,12}", last in "[A-Za-zÀ-ÿ]{2,12}") {
        let name = format!("{first} {last}");
        prop_assert!(validate_name(&name).is_ok());
    }

    #[test]
    fn single_token_names_are_invalid(name in "[A-Za-z]{3,20}") {
        prop_assert!(validate_name(&name).is_err());
    }
}
