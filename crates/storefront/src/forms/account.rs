//! Account details form.

use serde::Deserialize;
use woo_headless_core::Email;

use crate::woo::{Customer, CustomerUpdate};

use super::{FieldErrors, check_max_length, check_new_password, check_required};

/// Account details form data. Missing fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountDetailsForm {
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,
    /// New password; blank keeps the current one.
    pub password: String,
    pub password_confirm: String,
}

impl AccountDetailsForm {
    /// Prefill from the customer (passwords stay blank).
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            display_name: customer.display_name.clone(),
            email: customer.email.clone(),
            password: String::new(),
            password_confirm: String::new(),
        }
    }

    /// # Errors
    ///
    /// Returns field errors for a missing or invalid email, a missing
    /// display name, overlong names, or a short or mismatched new password.
    pub fn validate(&self) -> Result<CustomerUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let display_name = self.display_name.trim().to_string();
        let email = self.email.trim().to_string();

        check_max_length(&mut errors, "first_name", &first_name, "First name");
        check_max_length(&mut errors, "last_name", &last_name, "Last name");
        check_required(&mut errors, "display_name", &display_name, "Display name");
        check_max_length(&mut errors, "display_name", &display_name, "Display name");

        if email.is_empty() {
            errors.add("email", "Email is required.");
        } else if Email::parse(&email).is_err() {
            errors.add("email", "Enter a valid email address.");
        }

        let password = (!self.password.is_empty()).then(|| self.password.clone());
        if password.is_some() {
            check_new_password(&mut errors, &self.password, &self.password_confirm);
        }

        errors.into_result(CustomerUpdate {
            first_name: Some(first_name),
            last_name: Some(last_name),
            display_name: Some(display_name),
            email: Some(email),
            password,
            billing: None,
            shipping: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> AccountDetailsForm {
        AccountDetailsForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            display_name: "ada".to_string(),
            email: "ada@example.com".to_string(),
            ..AccountDetailsForm::default()
        }
    }

    #[test]
    fn test_blank_password_keeps_current() {
        let update = form().validate().unwrap();
        assert!(update.password.is_none());
        assert_eq!(update.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_new_password_checked() {
        let errors = AccountDetailsForm {
            password: "short".to_string(),
            password_confirm: "short".to_string(),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("password").is_some());

        let update = AccountDetailsForm {
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(update.password.as_deref(), Some("correct horse"));
    }

    #[test]
    fn test_email_and_display_name_required() {
        let errors = AccountDetailsForm {
            display_name: " ".to_string(),
            email: "nope".to_string(),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("display_name").is_some());
        assert_eq!(errors.get("email"), Some("Enter a valid email address."));
    }
}
