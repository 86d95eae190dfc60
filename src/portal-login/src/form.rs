//! Login form state.
//!
//! Each field keeps its value, its current error and whether the user has
//! left it at least once. Errors are recomputed for the whole form on every
//! change and blur, but only surface for touched fields.

use crate::types::LoginPayload;
use crate::validation::{self, Field, FieldErrors, ValidationError};

/// State of a single form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub value: String,
    pub error: Option<ValidationError>,
    pub touched: bool,
}

impl FieldState {
    /// Error to display, if the field has been touched.
    pub fn visible_error(&self) -> Option<ValidationError> {
        if self.touched { self.error } else { None }
    }
}

/// Phone + password form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    phone: FieldState,
    password: FieldState,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: Field) -> &FieldState {
        match field {
            Field::Phone => &self.phone,
            Field::Password => &self.password,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut FieldState {
        match field {
            Field::Phone => &mut self.phone,
            Field::Password => &mut self.password,
        }
    }

    /// Update a field's value and re-validate.
    pub fn change(&mut self, field: Field, value: impl Into<String>) -> FieldErrors {
        self.field_mut(field).value = value.into();
        self.validate()
    }

    /// Mark a field as touched and re-validate.
    pub fn blur(&mut self, field: Field) -> FieldErrors {
        self.field_mut(field).touched = true;
        self.validate()
    }

    /// Mark every field as touched, as a submit attempt does.
    pub fn touch_all(&mut self) {
        self.phone.touched = true;
        self.password.touched = true;
    }

    /// Run the validation rules and store the displayed error per field.
    pub fn validate(&mut self) -> FieldErrors {
        let errors = validation::validate(&self.phone.value, &self.password.value);
        self.phone.error = errors.first(Field::Phone);
        self.password.error = errors.first(Field::Password);
        errors
    }

    pub fn is_valid(&self) -> bool {
        validation::validate(&self.phone.value, &self.password.value).is_empty()
    }

    /// Credentials to submit.
    pub fn payload(&self) -> LoginPayload {
        LoginPayload::new(self.phone.value.clone(), self.password.value.clone())
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("phone", &self.phone)
            .field("password_len", &self.password.value.chars().count())
            .field("password_error", &self.password.error)
            .field("password_touched", &self.password.touched)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_validates_without_touching() {
        let mut form = LoginForm::new();
        let errors = form.change(Field::Phone, "abc");
        assert!(!errors.is_empty());
        assert_eq!(
            form.field(Field::Phone).error,
            Some(ValidationError::PhonePattern)
        );
        assert_eq!(form.field(Field::Phone).visible_error(), None);
    }

    #[test]
    fn test_blur_reveals_error() {
        let mut form = LoginForm::new();
        form.change(Field::Phone, "093812345");
        form.blur(Field::Phone);
        assert_eq!(
            form.field(Field::Phone).visible_error(),
            Some(ValidationError::PhoneLength)
        );
        // Untouched password keeps its error hidden.
        assert_eq!(
            form.field(Field::Password).error,
            Some(ValidationError::PasswordRequired)
        );
        assert_eq!(form.field(Field::Password).visible_error(), None);
    }

    #[test]
    fn test_fixing_value_clears_error() {
        let mut form = LoginForm::new();
        form.change(Field::Password, "123");
        form.blur(Field::Password);
        assert!(form.field(Field::Password).visible_error().is_some());
        form.change(Field::Password, "123456");
        assert_eq!(form.field(Field::Password).visible_error(), None);
    }

    #[test]
    fn test_payload_and_validity() {
        let mut form = LoginForm::new();
        assert!(!form.is_valid());
        form.change(Field::Phone, "0938123456");
        form.change(Field::Password, "secret1");
        assert!(form.is_valid());
        let payload = form.payload();
        assert_eq!(payload.phone, "0938123456");
        assert_eq!(payload.password, "secret1");
    }

    #[test]
    fn test_debug_hides_password() {
        let mut form = LoginForm::new();
        form.change(Field::Password, "hunter22");
        assert!(!format!("{form:?}").contains("hunter22"));
    }
}
