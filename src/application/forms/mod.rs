//! Form validation
//!
//! Each form is a plain struct deserialized from the request body. Field rules
//! are declared with `validator`; [`validate_form`] adds the "required" check
//! and cross-field rules on top and collects everything into [`FormErrors`].
//! Rules that need the user store (username uniqueness) live in each form's
//! async `clean` method.

mod delete;
mod sign_in;
mod sign_up;
mod update;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::shared::DomainError;

pub use delete::DeleteForm;
pub use sign_in::SignInForm;
pub use sign_up::{NewAccount, SignUpForm};
pub use update::UpdateForm;

pub const REQUIRED: &str = "This field is required.";
pub const USERNAME_TAKEN: &str = "This username already exists.";
pub const PASSWORDS_MISMATCH: &str = "Passwords must match.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const USERNAME_PATTERN_MESSAGE: &str =
    "Username must contain only lowercase letters, numbers, underline and dot.";

static USERNAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_.]+$").ok());

/// Lowercase letters, digits, underscore and dot only.
///
/// Empty values pass; emptiness is reported by the required check.
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.is_empty()
        || USERNAME_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(value))
    {
        return Ok(());
    }
    Err(ValidationError::new("username_pattern")
        .with_message(Cow::Borrowed(USERNAME_PATTERN_MESSAGE)))
}

/// Field-level and form-level error messages, in the shape templates expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Fold `validator` output in. Fields that already failed the required
    /// check keep only that message.
    pub fn merge(&mut self, errors: ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            let field = field.to_string();
            if self.field(&field).iter().any(|m| m == REQUIRED) {
                continue;
            }
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                self.add(&field, message);
            }
        }
    }

    /// `Ok` when nothing was reported.
    pub fn check(self) -> Result<(), CleanError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CleanError::Invalid(self))
        }
    }
}

/// Why a form could not produce clean data.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("form has errors")]
    Invalid(FormErrors),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Declarative part of a form: normalization, required fields and
/// cross-field rules on top of its `validator` attributes.
pub trait FormFields: Validate {
    fn normalize(&mut self) {}

    /// `(field, value)` pairs that must not be empty.
    fn required(&self) -> Vec<(&'static str, &str)>;

    /// Rules spanning several fields. Runs after per-field validation.
    fn check_fields(&self, _errors: &mut FormErrors) {}
}

/// Normalize `form` and run every synchronous rule on it.
pub fn validate_form<T: FormFields>(form: &mut T) -> FormErrors {
    form.normalize();

    let mut errors = FormErrors::default();
    for (field, value) in form.required() {
        if value.is_empty() {
            errors.add(field, REQUIRED);
        }
    }
    if let Err(validation) = form.validate() {
        errors.merge(validation);
    }
    form.check_fields(&mut errors);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_pattern_accepts_lowercase_digits_underscore_dot() {
        assert!(validate_username("alice_01.b").is_ok());
        assert!(validate_username("").is_ok());
    }

    #[test]
    fn username_pattern_rejects_uppercase_and_symbols() {
        for bad in ["Alice", "bob smith", "carol-x", "dave@home", "émile"] {
            let err = validate_username(bad).unwrap_err();
            assert_eq!(err.code, "username_pattern", "{bad} should be rejected");
        }
    }

    #[test]
    fn form_errors_collect_and_check() {
        let mut errors = FormErrors::default();
        assert!(errors.clone().check().is_ok());

        errors.add("username", USERNAME_TAKEN);
        errors.add_non_field(PASSWORDS_MISMATCH);
        assert!(errors.has_field("username"));
        assert_eq!(errors.field("username"), [USERNAME_TAKEN.to_string()]);
        assert!(errors.field("email").is_empty());

        match errors.check() {
            Err(CleanError::Invalid(e)) => assert_eq!(e.non_field, vec![PASSWORDS_MISMATCH]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn form_errors_serialize_for_templates() {
        let mut errors = FormErrors::default();
        errors.add("email", INVALID_EMAIL);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["fields"]["email"][0], INVALID_EMAIL);
        assert_eq!(json["non_field"], serde_json::json!([]));
    }
}
