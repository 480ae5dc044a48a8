//! WooCommerce GraphQL client (WPGraphQL + WooGraphQL).
//!
//! # Architecture
//!
//! - One POST endpoint; request bodies come from `graphql_client::GraphQLQuery`
//!   implementations whose documents live in `graphql/*.graphql`
//! - WooCommerce is the source of truth for catalog, cart, orders and customers;
//!   nothing is synced locally
//! - Catalog reads are cached in `moka`; cart, checkout and customer calls never are
//!
//! # Sessions
//!
//! The cart is keyed by the `woocommerce-session` token. Callers pass the
//! token they hold in a [`RequestContext`] and get back an [`Envelope`] that
//! carries the (possibly refreshed) token from the response headers.
//!
//! # Example
//!
//! ```rust,ignore
//! use woo_headless_storefront::woo::{CartLineInput, RequestContext, WooClient};
//!
//! let client = WooClient::new(&config.woo);
//! let product = client.get_product_by_slug("hoodie").await?;
//!
//! let ctx = RequestContext::new(session_token.as_deref(), None);
//! let line = CartLineInput {
//!     product_id: product.summary.id,
//!     variation_id: None,
//!     quantity: Quantity::ONE,
//!     attributes: Vec::new(),
//! };
//! let envelope = client.add_to_cart(&ctx, &line).await?;
//! save_token(envelope.session_token);
//! ```

mod cache;
mod cart;
mod catalog;
mod checkout;
mod client;
mod conversions;
mod customer;
mod queries;
mod site;
pub mod types;

pub use client::{Envelope, RequestContext, WooClient};
pub use types::*;

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Errors that can occur when talking to the WooCommerce GraphQL API.
#[derive(Debug, Error)]
pub enum WooError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The auth token was rejected or has expired.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from a mutation (e.g., invalid coupon, wrong password).
    #[error("User error: {0}")]
    UserError(String),
}

impl WooError {
    /// Message safe to show to the shopper, if this error is their doing.
    ///
    /// WooGraphQL reports business-rule failures ("Coupon code has expired",
    /// "Not enough stock") as GraphQL errors; those messages are written for
    /// customers. Transport and parse failures are not.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::UserError(message) => Some(strip_tags(message)),
            Self::GraphQL(errors) => {
                let messages: Vec<String> = errors
                    .iter()
                    .filter(|e| !e.message.is_empty() && !e.is_internal())
                    .map(|e| strip_tags(&e.message))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join(" "))
                }
            }
            _ => None,
        }
    }

    /// Classify a GraphQL error list, lifting auth failures out of it.
    pub(crate) fn from_graphql(errors: Vec<GraphQLError>) -> Self {
        if let Some(auth) = errors.iter().find(|e| e.is_auth_failure()) {
            return Self::Unauthorized(auth.message.clone());
        }
        Self::GraphQL(errors)
    }
}

/// A GraphQL error returned by the API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// Build an error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }

    /// Whether the message indicates a rejected or expired JWT.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        let message = self.message.to_ascii_lowercase();
        AUTH_FAILURE_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }

    /// Whether this is a server-side failure rather than a customer-facing rule.
    fn is_internal(&self) -> bool {
        self.message.starts_with("HTTP ")
            || self.message.contains("Internal server error")
            || self.message.starts_with("Cannot query field")
            || self.message.starts_with("Variable \"$")
    }
}

const AUTH_FAILURE_MARKERS: &[&str] = &[
    "expired token",
    "invalid-jwt",
    "invalid jwt",
    "not authorized",
    "you must be logged in",
];

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Regex for HTML tags in API notices.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

/// WooCommerce notices sometimes embed markup (`<strong>`, `<a>`).
fn strip_tags(message: &str) -> String {
    TAG_RE
        .replace_all(message, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_woo_error_display() {
        let err = WooError::NotFound("product hoodie".to_string());
        assert_eq!(err.to_string(), "Not found: product hoodie");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError::message("Field not found"),
            GraphQLError::message("Invalid ID"),
        ];
        let err = WooError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_empty_messages() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("products".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = WooError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: products.0 at line 5:10"
        );
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = WooError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_auth_failures_become_unauthorized() {
        let err = WooError::from_graphql(vec![GraphQLError::message(
            "invalid-jwt | The iss do not match with this server",
        )]);
        assert!(matches!(err, WooError::Unauthorized(_)));

        let err = WooError::from_graphql(vec![GraphQLError::message("Expired token")]);
        assert!(matches!(err, WooError::Unauthorized(_)));

        let err = WooError::from_graphql(vec![GraphQLError::message("No product ID provided")]);
        assert!(matches!(err, WooError::GraphQL(_)));
    }

    #[test]
    fn test_user_message_hides_internal_errors() {
        let err = WooError::GraphQL(vec![
            GraphQLError::message("Internal server error"),
            GraphQLError::message("Coupon \"<strong>SAVE10</strong>\" does not exist!"),
        ]);
        assert_eq!(
            err.user_message().as_deref(),
            Some("Coupon \"SAVE10\" does not exist!")
        );

        let err = WooError::GraphQL(vec![GraphQLError::message("HTTP 502 Bad Gateway: ")]);
        assert!(err.user_message().is_none());
        assert!(WooError::RateLimited(3).user_message().is_none());
    }

    #[test]
    fn test_rate_limited_error() {
        let err = WooError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
