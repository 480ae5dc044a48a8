//! Form parsing and validation.
//!
//! Each form deserializes from the submitted body with every field
//! optional-by-default, then `validate` returns either the checked domain
//! value or a [`FieldErrors`] map used to re-render the form.

pub mod account;
pub mod address;
pub mod auth;
pub mod cart;
pub mod checkout;

pub use account::AccountDetailsForm;
pub use address::{AddressForm, AddressKind};
pub use auth::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
pub use cart::{CouponForm, parse_quantity};
pub use checkout::CheckoutForm;

/// Longest accepted name field.
pub const MAX_NAME_LENGTH: usize = 100;

/// Shortest accepted new password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validation messages keyed by field name, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    /// Record an error. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.get(&field).is_none() {
            self.0.push((field, message.into()));
        }
    }

    /// Message for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// All messages, in order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, message)| message.as_str())
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when any error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// One rendered input: the submitted value plus its error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    /// Form field name (also the element id).
    pub name: String,
    pub label: &'static str,
    pub value: String,
    pub error: Option<String>,
    pub required: bool,
    /// HTML input type.
    pub input_type: &'static str,
    pub autocomplete: &'static str,
}

/// Trimmed value, or empty.
pub(crate) fn trimmed(value: Option<&String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Trimmed value, or `None` when blank.
pub(crate) fn optional(value: Option<&String>) -> Option<String> {
    let value = trimmed(value);
    (!value.is_empty()).then_some(value)
}

/// Checkbox-style flag.
pub(crate) fn is_checked(value: Option<&String>) -> bool {
    value.is_some_and(|v| matches!(v.trim(), "1" | "on" | "true" | "yes"))
}

pub(crate) fn check_required(errors: &mut FieldErrors, field: &str, value: &str, label: &str) {
    if value.is_empty() {
        errors.add(field, format!("{label} is required."));
    }
}

pub(crate) fn check_max_length(errors: &mut FieldErrors, field: &str, value: &str, label: &str) {
    if value.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            field,
            format!("{label} must be at most {MAX_NAME_LENGTH} characters."),
        );
    }
}

pub(crate) fn check_new_password(
    errors: &mut FieldErrors,
    password: &str,
    confirmation: &str,
) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
        );
    } else if password != confirmation {
        errors.add("password_confirm", "Passwords do not match.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_wins() {
        let mut errors = FieldErrors::default();
        errors.add("email", "Email is required.");
        errors.add("email", "Enter a valid email address.");
        errors.add("password", "Password is required.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Email is required."));
        assert_eq!(
            errors.messages().collect::<Vec<_>>(),
            vec!["Email is required.", "Password is required."]
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FieldErrors::default().into_result(3), Ok(3));
        let mut errors = FieldErrors::default();
        errors.add("x", "bad");
        assert!(errors.into_result(3).is_err());
    }

    #[test]
    fn test_is_checked() {
        assert!(is_checked(Some(&"on".to_string())));
        assert!(is_checked(Some(&"1".to_string())));
        assert!(!is_checked(Some(&"0".to_string())));
        assert!(!is_checked(None));
    }

    #[test]
    fn test_password_rules() {
        let mut errors = FieldErrors::default();
        check_new_password(&mut errors, "short", "short");
        assert!(errors.get("password").is_some());

        let mut errors = FieldErrors::default();
        check_new_password(&mut errors, "long enough", "long enougH");
        assert_eq!(errors.get("password_confirm"), Some("Passwords do not match."));

        let mut errors = FieldErrors::default();
        check_new_password(&mut errors, "long enough", "long enough");
        assert!(errors.is_empty());
    }
}
