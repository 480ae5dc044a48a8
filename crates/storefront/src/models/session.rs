//! Session-related types.
//!
//! The session holds only credentials and the last order receipt; carts,
//! customers and orders are always re-read from WooCommerce.

use serde::{Deserialize, Serialize};

use woo_headless_core::CustomerId;

use crate::woo::Order;

/// Seconds before expiry at which the auth token is refreshed.
pub const AUTH_REFRESH_MARGIN_SECS: i64 = 60;

/// Session-stored customer identity and JWTs.
#[derive(Clone, Serialize, Deserialize)]
pub struct CustomerSession {
    pub id: CustomerId,
    pub email: String,
    pub display_name: String,
    pub auth_token: String,
    pub refresh_token: String,
    /// `exp` claim of the auth token (unix seconds), when it could be read.
    pub auth_expires_at: Option<i64>,
}

impl CustomerSession {
    /// Whether the auth token expires within the refresh margin of `now`.
    ///
    /// A token whose expiry could not be read is used as-is; the API will
    /// reject it if it has lapsed.
    #[must_use]
    pub fn needs_refresh(&self, now: i64) -> bool {
        self.auth_expires_at
            .is_some_and(|exp| exp - now <= AUTH_REFRESH_MARGIN_SECS)
    }
}

impl std::fmt::Debug for CustomerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerSession")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("auth_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("auth_expires_at", &self.auth_expires_at)
            .finish()
    }
}

/// The order just placed, shown on the order-received page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order: Order,
}

/// One-shot notice shown on the next full page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub message: String,
    pub is_error: bool,
}

impl Flash {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Logged-in customer ([`super::CustomerSession`]).
    pub const CUSTOMER: &str = "customer";

    /// WooCommerce session token identifying the cart.
    pub const WOO_SESSION: &str = "woo_session";

    /// Last placed order ([`super::OrderReceipt`]).
    pub const ORDER_RECEIPT: &str = "order_receipt";

    /// Pending [`super::Flash`] notice.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(expires: Option<i64>) -> CustomerSession {
        CustomerSession {
            id: CustomerId::new(7),
            email: "ada@example.com".to_string(),
            display_name: "Ada".to_string(),
            auth_token: "header.payload.sig".to_string(),
            refresh_token: "refresh-secret".to_string(),
            auth_expires_at: expires,
        }
    }

    #[test]
    fn test_needs_refresh_near_expiry() {
        assert!(customer(Some(1_000)).needs_refresh(950));
        assert!(customer(Some(1_000)).needs_refresh(2_000));
        assert!(!customer(Some(1_000)).needs_refresh(900));
        assert!(!customer(None).needs_refresh(i64::MAX));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", customer(None));
        assert!(!debug.contains("refresh-secret"));
        assert!(!debug.contains("payload"));
        assert!(debug.contains("ada@example.com"));
    }
}
