//! Login, registration and password reset forms.

use serde::Deserialize;
use woo_headless_core::Email;

use crate::woo::NewCustomer;

use super::{FieldErrors, check_max_length, check_new_password, check_required, optional, trimmed};

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    /// Username or email.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Local path to return to after login.
    pub next: Option<String>,
}

/// Checked login credentials.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns field errors when either field is blank.
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::default();
        let username = trimmed(self.username.as_ref());
        let password = self.password.clone().unwrap_or_default();

        check_required(&mut errors, "username", &username, "Email or username");
        if password.is_empty() {
            errors.add("password", "Password is required.");
        }

        errors.into_result(Credentials { username, password })
    }

    /// Where to go after login: the `next` path if it stays on this site.
    #[must_use]
    pub fn redirect_target(&self) -> String {
        safe_next(self.next.as_deref()).unwrap_or_else(|| "/account".to_string())
    }
}

/// Accept only same-site absolute paths (`/account/orders`), never
/// `//evil.example` or full URLs.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    (next.starts_with('/') && !next.starts_with("//") && !next.contains('\\'))
        .then(|| next.to_string())
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns field errors for an invalid email, a short or mismatched
    /// password, or overlong names.
    pub fn validate(&self) -> Result<NewCustomer, FieldErrors> {
        let mut errors = FieldErrors::default();

        let email = trimmed(self.email.as_ref());
        if email.is_empty() {
            errors.add("email", "Email is required.");
        } else if Email::parse(&email).is_err() {
            errors.add("email", "Enter a valid email address.");
        }

        let password = self.password.clone().unwrap_or_default();
        let confirmation = self.password_confirm.clone().unwrap_or_default();
        check_new_password(&mut errors, &password, &confirmation);

        let first_name = optional(self.first_name.as_ref());
        let last_name = optional(self.last_name.as_ref());
        check_max_length(
            &mut errors,
            "first_name",
            first_name.as_deref().unwrap_or_default(),
            "First name",
        );
        check_max_length(
            &mut errors,
            "last_name",
            last_name.as_deref().unwrap_or_default(),
            "Last name",
        );

        errors.into_result(NewCustomer {
            email,
            password,
            first_name,
            last_name,
        })
    }
}

/// Forgot password form data.
#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordForm {
    /// Username or email.
    pub username: Option<String>,
}

impl ForgotPasswordForm {
    /// # Errors
    ///
    /// Returns a field error when blank.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::default();
        let username = trimmed(self.username.as_ref());
        check_required(&mut errors, "username", &username, "Email or username");
        errors.into_result(username)
    }
}

/// Reset password form data. `key` and `login` come from the email link.
#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordForm {
    pub key: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// Checked password reset.
#[derive(Debug)]
pub struct PasswordReset {
    pub key: String,
    pub login: String,
    pub password: String,
}

impl ResetPasswordForm {
    /// # Errors
    ///
    /// Returns field errors for a missing link key or a short or mismatched
    /// password.
    pub fn validate(&self) -> Result<PasswordReset, FieldErrors> {
        let mut errors = FieldErrors::default();
        let key = trimmed(self.key.as_ref());
        let login = trimmed(self.login.as_ref());
        if key.is_empty() || login.is_empty() {
            errors.add(
                "form",
                "This password reset link is invalid. Please request a new one.",
            );
        }

        let password = self.password.clone().unwrap_or_default();
        let confirmation = self.password_confirm.clone().unwrap_or_default();
        check_new_password(&mut errors, &password, &confirmation);

        errors.into_result(PasswordReset {
            key,
            login,
            password,
        })
    }
}
