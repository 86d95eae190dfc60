//! Credential validation rules for the login form.
//!
//! Rules per field, in the order they are reported:
//! - phone: digits only (`^[0-9]+$`), length 10..=11, required
//! - password: at least 6 characters, required
//!
//! An empty field only reports "required"; the remaining rules skip absent
//! values. The message shown for a field is its first error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::i18n::{Locale, Message, text};

/// Minimum phone number length, inclusive.
pub const PHONE_MIN_LEN: usize = 10;

/// Maximum phone number length, inclusive.
pub const PHONE_MAX_LEN: usize = 11;

/// Minimum password length, inclusive.
pub const PASSWORD_MIN_LEN: usize = 6;

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("phone pattern is a valid regex"));

/// Form fields subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Phone,
    Password,
}

/// A single failed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    PhoneRequired,
    PhonePattern,
    PhoneLength,
    PasswordRequired,
    PasswordTooShort,
}

impl ValidationError {
    /// Localized message for this error.
    pub fn message(&self, locale: Locale) -> &'static str {
        let key = match self {
            ValidationError::PhoneRequired => Message::PhoneRequired,
            ValidationError::PhonePattern => Message::PhonePattern,
            ValidationError::PhoneLength => Message::PhoneLength,
            ValidationError::PasswordRequired => Message::PasswordRequired,
            ValidationError::PasswordTooShort => Message::PasswordTooShort,
        };
        text(locale, key)
    }
}

/// Field-level validation result. Empty means the form may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    phone: Vec<ValidationError>,
    password: Vec<ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.phone.is_empty() && self.password.is_empty()
    }

    /// All errors for a field, in rule order.
    pub fn get(&self, field: Field) -> &[ValidationError] {
        match field {
            Field::Phone => &self.phone,
            Field::Password => &self.password,
        }
    }

    /// The error displayed for a field.
    pub fn first(&self, field: Field) -> Option<ValidationError> {
        self.get(field).first().copied()
    }

    /// Iterate over every error of every field.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.phone.iter().chain(self.password.iter())
    }
}

/// Validate a phone number.
pub fn validate_phone(phone: &str) -> Vec<ValidationError> {
    if phone.is_empty() {
        return vec![ValidationError::PhoneRequired];
    }

    let mut errors = Vec::new();
    if !PHONE_PATTERN.is_match(phone) {
        errors.push(ValidationError::PhonePattern);
    }
    let len = phone.chars().count();
    if !(PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&len) {
        errors.push(ValidationError::PhoneLength);
    }
    errors
}

/// Validate a password.
pub fn validate_password(password: &str) -> Vec<ValidationError> {
    if password.is_empty() {
        return vec![ValidationError::PasswordRequired];
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return vec![ValidationError::PasswordTooShort];
    }
    Vec::new()
}

/// Validate both credentials.
pub fn validate(phone: &str, password: &str) -> FieldErrors {
    FieldErrors {
        phone: validate_phone(phone),
        password: validate_password(password),
    }
}
