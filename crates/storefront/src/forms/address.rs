//! Billing and shipping address forms.

use std::collections::HashMap;

use serde::Deserialize;
use woo_headless_core::Email;

use crate::woo::Address;

use super::{FieldErrors, FieldView, check_max_length, check_required};

/// Which of the customer's two addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Billing,
    Shipping,
}

impl AddressKind {
    /// Parse the `{kind}` path segment.
    #[must_use]
    pub fn from_path(value: &str) -> Option<Self> {
        match value {
            "billing" => Some(Self::Billing),
            "shipping" => Some(Self::Shipping),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Shipping => "shipping",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Billing => "Billing address",
            Self::Shipping => "Shipping address",
        }
    }
}

/// Address form data. Missing fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressForm {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

impl AddressForm {
    /// Prefill from a stored address.
    #[must_use]
    pub fn from_address(address: &Address) -> Self {
        Self {
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            company: address.company.clone(),
            address_1: address.address_1.clone(),
            address_2: address.address_2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postcode: address.postcode.clone(),
            country: address.country.clone(),
            email: address.email.clone(),
            phone: address.phone.clone(),
        }
    }

    /// Read `<prefix><field>` keys (`billing_city`) from a flat form.
    #[must_use]
    pub fn from_prefixed(fields: &HashMap<String, String>, prefix: &str) -> Self {
        let get = |name: &str| {
            fields
                .get(&format!("{prefix}{name}"))
                .cloned()
                .unwrap_or_default()
        };
        Self {
            first_name: get("first_name"),
            last_name: get("last_name"),
            company: get("company"),
            address_1: get("address_1"),
            address_2: get("address_2"),
            city: get("city"),
            state: get("state"),
            postcode: get("postcode"),
            country: get("country"),
            email: get("email"),
            phone: get("phone"),
        }
    }

    /// # Errors
    ///
    /// Returns field errors for missing required fields, an invalid country
    /// code, a missing or invalid billing email, or a malformed phone.
    pub fn validate(&self, kind: AddressKind) -> Result<Address, FieldErrors> {
        let mut errors = FieldErrors::default();
        let address = self.check(kind, "", &mut errors);
        errors.into_result(address)
    }

    /// Inputs for rendering, named `<prefix><field>`.
    #[must_use]
    pub fn fields(&self, kind: AddressKind, prefix: &str, errors: &FieldErrors) -> Vec<FieldView> {
        let mut specs = vec![
            ("first_name", "First name", &self.first_name, true, "text", "given-name"),
            ("last_name", "Last name", &self.last_name, true, "text", "family-name"),
            ("company", "Company", &self.company, false, "text", "organization"),
            ("address_1", "Street address", &self.address_1, true, "text", "address-line1"),
            ("address_2", "Apartment, suite, etc.", &self.address_2, false, "text", "address-line2"),
            ("city", "Town / City", &self.city, true, "text", "address-level2"),
            ("state", "State / County", &self.state, false, "text", "address-level1"),
            ("postcode", "Postcode / ZIP", &self.postcode, true, "text", "postal-code"),
            ("country", "Country code", &self.country, true, "text", "country"),
            ("phone", "Phone", &self.phone, false, "tel", "tel"),
        ];
        if kind == AddressKind::Billing {
            specs.push(("email", "Email address", &self.email, true, "email", "email"));
        }

        specs
            .into_iter()
            .map(|(name, label, value, required, input_type, autocomplete)| {
                let name = format!("{prefix}{name}");
                FieldView {
                    error: errors.get(&name).map(ToString::to_string),
                    name,
                    label,
                    value: value.clone(),
                    required,
                    input_type,
                    autocomplete: if kind == AddressKind::Shipping {
                        shipping_autocomplete(autocomplete)
                    } else {
                        autocomplete
                    },
                }
            })
            .collect()
    }

    /// Validate into `errors`, naming fields `<prefix><field>`.
    pub(crate) fn check(&self, kind: AddressKind, prefix: &str, errors: &mut FieldErrors) -> Address {
        let address = Address {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            company: self.company.trim().to_string(),
            address_1: self.address_1.trim().to_string(),
            address_2: self.address_2.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postcode: self.postcode.trim().to_string(),
            country: self.country.trim().to_ascii_uppercase(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        };
        let field = |name: &str| format!("{prefix}{name}");

        for (name, value, label) in [
            ("first_name", &address.first_name, "First name"),
            ("last_name", &address.last_name, "Last name"),
            ("address_1", &address.address_1, "Street address"),
            ("city", &address.city, "Town / City"),
            ("postcode", &address.postcode, "Postcode / ZIP"),
            ("country", &address.country, "Country"),
        ] {
            check_required(errors, &field(name), value, label);
        }
        check_max_length(errors, &field("first_name"), &address.first_name, "First name");
        check_max_length(errors, &field("last_name"), &address.last_name, "Last name");

        if !address.country.is_empty() && !is_country_code(&address.country) {
            errors.add(field("country"), "Choose a valid country.");
        }

        if kind == AddressKind::Billing {
            if address.email.is_empty() {
                errors.add(field("email"), "Email is required.");
            } else if Email::parse(&address.email).is_err() {
                errors.add(field("email"), "Enter a valid email address.");
            }
        }

        if !address.phone.is_empty() && !is_phone(&address.phone) {
            errors.add(field("phone"), "Enter a valid phone number.");
        }

        address
    }
}

fn shipping_autocomplete(token: &'static str) -> &'static str {
    match token {
        "given-name" => "shipping given-name",
        "family-name" => "shipping family-name",
        "organization" => "shipping organization",
        "address-line1" => "shipping address-line1",
        "address-line2" => "shipping address-line2",
        "address-level2" => "shipping address-level2",
        "address-level1" => "shipping address-level1",
        "postal-code" => "shipping postal-code",
        "country" => "shipping country",
        "tel" => "shipping tel",
        other => other,
    }
}

/// ISO 3166-1 alpha-2 shape: two ASCII letters.
fn is_country_code(value: &str) -> bool {
    value.len() == 2 && value.chars().all(|c| c.is_ascii_uppercase())
}

/// Digits plus spacing and `+-()`, with at least one digit.
fn is_phone(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> AddressForm {
        AddressForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address_1: "12 St James's Square".to_string(),
            city: "London".to_string(),
            postcode: "SW1Y 4JH".to_string(),
            country: "gb".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+44 (20) 7946-0000".to_string(),
            ..AddressForm::default()
        }
    }

    #[test]
    fn test_valid_billing_address() {
        let address = valid().validate(AddressKind::Billing).unwrap();
        assert_eq!(address.country, "GB");
        assert_eq!(address.email, "ada@example.com");
    }

    #[test]
    fn test_required_fields() {
        let errors = AddressForm::default()
            .validate(AddressKind::Shipping)
            .unwrap_err();
        for field in ["first_name", "last_name", "address_1", "city", "postcode", "country"] {
            assert!(errors.get(field).is_some(), "{field} should be required");
        }
        assert!(errors.get("email").is_none());
    }

    #[test]
    fn test_billing_needs_valid_email() {
        let form = AddressForm {
            email: String::new(),
            ..valid()
        };
        assert!(form.validate(AddressKind::Shipping).is_ok());
        assert_eq!(
            form.validate(AddressKind::Billing).unwrap_err().get("email"),
            Some("Email is required.")
        );

        let form = AddressForm {
            email: "ada@".to_string(),
            ..valid()
        };
        assert_eq!(
            form.validate(AddressKind::Billing).unwrap_err().get("email"),
            Some("Enter a valid email address.")
        );
    }

    #[test]
    fn test_country_and_phone_shape() {
        let form = AddressForm {
            country: "GBR".to_string(),
            phone: "call me".to_string(),
            ..valid()
        };
        let errors = form.validate(AddressKind::Billing).unwrap_err();
        assert_eq!(errors.get("country"), Some("Choose a valid country."));
        assert_eq!(errors.get("phone"), Some("Enter a valid phone number."));
    }

    #[test]
    fn test_prefixed_fields() {
        let fields: HashMap<String, String> = [
            ("shipping_first_name", "Grace"),
            ("shipping_city", "Arlington"),
            ("billing_city", "London"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let form = AddressForm::from_prefixed(&fields, "shipping_");
        assert_eq!(form.first_name, "Grace");
        assert_eq!(form.city, "Arlington");

        let mut errors = FieldErrors::default();
        form.check(AddressKind::Shipping, "shipping_", &mut errors);
        assert!(errors.get("shipping_last_name").is_some());
        assert!(errors.get("last_name").is_none());
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(AddressKind::from_path("billing"), Some(AddressKind::Billing));
        assert_eq!(AddressKind::from_path("work"), None);
    }

    #[test]
    fn test_fields_carry_values_and_errors() {
        let form = AddressForm {
            city: String::new(),
            ..valid()
        };
        let errors = form.validate(AddressKind::Shipping).unwrap_err();
        let fields = form.fields(AddressKind::Shipping, "", &errors);

        assert!(fields.iter().all(|f| f.name != "email"));
        let city = fields.iter().find(|f| f.name == "city").unwrap();
        assert_eq!(city.error.as_deref(), Some("Town / City is required."));
        assert_eq!(city.autocomplete, "shipping address-level2");

        let billing = valid().fields(AddressKind::Billing, "billing_", &FieldErrors::default());
        let email = billing.iter().find(|f| f.name == "billing_email").unwrap();
        assert_eq!(email.value, "ada@example.com");
        assert_eq!(email.input_type, "email");
        assert!(billing.iter().all(|f| f.error.is_none()));
    }
}
