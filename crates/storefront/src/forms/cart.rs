//! Cart forms.

use serde::Deserialize;
use woo_headless_core::Quantity;

use super::FieldErrors;

/// Longest coupon code WooCommerce accepts in practice.
const MAX_COUPON_LENGTH: usize = 50;

/// Parse a submitted quantity.
///
/// Anything below one becomes one (removal is its own action); digit
/// strings too long for an integer become the maximum; anything else
/// unparseable becomes one.
#[must_use]
pub fn parse_quantity(value: Option<&str>) -> Quantity {
    let Some(value) = value.map(str::trim) else {
        return Quantity::default();
    };
    match value.parse::<i64>() {
        Ok(n) => Quantity::clamped(n),
        Err(_) if is_positive_digits(value) => Quantity::clamped(i64::MAX),
        Err(_) => Quantity::default(),
    }
}

fn is_positive_digits(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Coupon form data.
#[derive(Debug, Default, Deserialize)]
pub struct CouponForm {
    pub code: Option<String>,
}

impl CouponForm {
    /// # Errors
    ///
    /// Returns a field error for a blank or overlong code.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::default();
        let code = self
            .code
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_lowercase();
        if code.is_empty() {
            errors.add("code", "Enter a coupon code.");
        } else if code.chars().count() > MAX_COUPON_LENGTH {
            errors.add("code", "That coupon code is too long.");
        }
        errors.into_result(code)
    }
}
