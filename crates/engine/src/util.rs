//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Trim and NFC-normalize a display name. Empty names are rejected.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(normalized)
}

/// Trim optional free text; blank becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// `None` keeps the stored value, `Some("")` clears it.
pub(crate) fn apply_optional_text_patch(
    existing: Option<String>,
    patch: Option<&str>,
) -> Option<String> {
    match patch {
        None => existing,
        Some(value) => normalize_optional_text(Some(value)),
    }
}

/// Largest accepted transaction amount and initial balance magnitude, in
/// minor units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

pub(crate) fn validate_amount(amount: i64) -> ResultEngine<()> {
    if amount < 0 {
        return Err(EngineError::InvalidAmount(
            "amount must be non-negative".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(EngineError::InvalidAmount(format!(
            "amount must not exceed {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_initial_balance(initial_balance: i64) -> ResultEngine<()> {
    if !(-MAX_AMOUNT..=MAX_AMOUNT).contains(&initial_balance) {
        return Err(EngineError::InvalidAmount(format!(
            "initial balance must be between -{MAX_AMOUNT} and {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

pub(crate) fn balance_out_of_range() -> EngineError {
    EngineError::InvalidAmount("account balance out of range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed_and_composed() {
        // "e" + combining acute accent composes to a single code point.
        let name = normalize_required_name("  Caffe\u{301} ", "category").unwrap();
        assert_eq!(name, "Caff\u{e9}");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = normalize_required_name("   ", "account").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidName("account name must not be empty".to_string())
        );
    }

    #[test]
    fn text_patch_semantics() {
        let existing = Some("lunch".to_string());
        assert_eq!(apply_optional_text_patch(existing.clone(), None), existing);
        assert_eq!(apply_optional_text_patch(existing.clone(), Some("  ")), None);
        assert_eq!(
            apply_optional_text_patch(existing, Some(" dinner ")),
            Some("dinner".to_string())
        );
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert!(validate_amount(0).is_ok());
        assert!(validate_amount(-1).is_err());
    }

    #[test]
    fn amounts_are_capped() {
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert!(validate_amount(MAX_AMOUNT + 1).is_err());
        assert!(validate_amount(i64::MAX).is_err());

        assert!(validate_initial_balance(-MAX_AMOUNT).is_ok());
        assert!(validate_initial_balance(MAX_AMOUNT).is_ok());
        assert!(validate_initial_balance(i64::MIN).is_err());
        assert!(validate_initial_balance(MAX_AMOUNT + 1).is_err());
    }

    #[test]
    fn parse_uuid_labels_errors() {
        let err = parse_uuid("nope", "account").unwrap_err();
        assert_eq!(err, EngineError::InvalidId("invalid account id".to_string()));
    }
}
