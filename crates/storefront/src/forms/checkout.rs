//! Checkout form.

use std::collections::HashMap;

use crate::woo::{CheckoutRequest, PaymentGateway};

use super::address::{AddressForm, AddressKind};
use super::{FieldErrors, is_checked, optional};

/// Longest accepted order note.
pub const MAX_NOTE_LENGTH: usize = 1000;

/// Checkout form data, read from flat `billing_*`/`shipping_*` fields.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub billing: AddressForm,
    pub shipping: AddressForm,
    pub ship_to_different_address: bool,
    pub payment_method: String,
    pub shipping_method: Option<String>,
    pub customer_note: String,
}

impl CheckoutForm {
    /// Parse the submitted fields.
    #[must_use]
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            billing: AddressForm::from_prefixed(fields, "billing_"),
            shipping: AddressForm::from_prefixed(fields, "shipping_"),
            ship_to_different_address: is_checked(fields.get("ship_to_different_address")),
            payment_method: fields
                .get("payment_method")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            shipping_method: optional(fields.get("shipping_method")),
            customer_note: fields.get("customer_note").cloned().unwrap_or_default(),
        }
    }

    /// # Errors
    ///
    /// Returns field errors for an invalid billing address, an invalid
    /// shipping address when shipping elsewhere, a payment method that is
    /// not offered, or an overlong note.
    pub fn validate(&self, gateways: &[PaymentGateway]) -> Result<CheckoutRequest, FieldErrors> {
        let mut errors = FieldErrors::default();

        let billing = self.billing.check(AddressKind::Billing, "billing_", &mut errors);
        let shipping = self
            .ship_to_different_address
            .then(|| self.shipping.check(AddressKind::Shipping, "shipping_", &mut errors));

        if self.payment_method.is_empty() {
            errors.add("payment_method", "Choose a payment method.");
        } else if !gateways.iter().any(|g| g.id == self.payment_method) {
            errors.add("payment_method", "That payment method is not available.");
        }

        let note = self.customer_note.trim();
        if note.chars().count() > MAX_NOTE_LENGTH {
            errors.add(
                "customer_note",
                format!("Order notes must be at most {MAX_NOTE_LENGTH} characters."),
            );
        }

        errors.into_result(CheckoutRequest {
            payment_method: self.payment_method.clone(),
            billing,
            shipping,
            customer_note: (!note.is_empty()).then(|| note.to_string()),
            shipping_method: self.shipping_method.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gateways() -> Vec<PaymentGateway> {
        vec![PaymentGateway {
            id: "cod".to_string(),
            title: "Cash on delivery".to_string(),
            description: String::new(),
        }]
    }

    fn fields(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut fields: HashMap<String, String> = [
            ("billing_first_name", "Ada"),
            ("billing_last_name", "Lovelace"),
            ("billing_address_1", "1 Analytical Way"),
            ("billing_city", "London"),
            ("billing_postcode", "N1 9GU"),
            ("billing_country", "GB"),
            ("billing_email", "ada@example.com"),
            ("payment_method", "cod"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            fields.insert((*k).to_string(), (*v).to_string());
        }
        fields
    }

    #[test]
    fn test_valid_checkout_ships_to_billing() {
        let request = CheckoutForm::from_fields(&fields(&[("customer_note", "  ")]))
            .validate(&gateways())
            .unwrap();
        assert_eq!(request.payment_method, "cod");
        assert!(request.shipping.is_none());
        assert_eq!(request.customer_note, None);
    }

    #[test]
    fn test_shipping_address_checked_only_when_requested() {
        let form = CheckoutForm::from_fields(&fields(&[("ship_to_different_address", "1")]));
        let errors = form.validate(&gateways()).unwrap_err();
        assert!(errors.get("shipping_first_name").is_some());
        assert!(errors.get("billing_first_name").is_none());
    }

    #[test]
    fn test_unknown_gateway_rejected() {
        let form = CheckoutForm::from_fields(&fields(&[("payment_method", "bitcoin")]));
        let errors = form.validate(&gateways()).unwrap_err();
        assert_eq!(
            errors.get("payment_method"),
            Some("That payment method is not available.")
        );
    }

    #[test]
    fn test_long_note_rejected() {
        let note = "a".repeat(MAX_NOTE_LENGTH + 1);
        let form = CheckoutForm::from_fields(&fields(&[("customer_note", &note)]));
        assert!(form.validate(&gateways()).unwrap_err().get("customer_note").is_some());
    }
}
