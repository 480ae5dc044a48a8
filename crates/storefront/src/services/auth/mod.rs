//! Customer session lifecycle.
//!
//! Passwords and JWTs are issued by WooGraphQL; this module only stores the
//! tokens in the session and refreshes the auth token before it expires.

mod error;

pub use error::AuthError;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::models::{CustomerSession, session_keys};
use crate::woo::{LoginResult, WooClient};

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Read the `exp` claim from a JWT without verifying it.
///
/// The token is only ever checked by the API that issued it; the expiry is
/// used to decide when to refresh.
#[must_use]
pub fn decode_jwt_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<Claims>(&bytes).ok()?.exp
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Get the logged-in customer, if any.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn current_customer(session: &Session) -> Result<Option<CustomerSession>, AuthError> {
    Ok(session.get(session_keys::CUSTOMER).await?)
}

/// Store a fresh login in the session.
///
/// The session id is cycled to prevent fixation. The customer's cart
/// session token replaces the guest one so the merged cart follows them.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn start_customer_session(
    session: &Session,
    login: &LoginResult,
    response_session_token: Option<&str>,
) -> Result<CustomerSession, AuthError> {
    let customer = CustomerSession {
        id: login.customer.id,
        email: login.customer.email.clone(),
        display_name: login.customer.display_name.clone(),
        auth_token: login.tokens.auth_token.clone(),
        refresh_token: login.tokens.refresh_token.clone(),
        auth_expires_at: decode_jwt_expiry(&login.tokens.auth_token),
    };

    session.cycle_id().await?;
    session.insert(session_keys::CUSTOMER, &customer).await?;

    if let Some(token) = login.session_token.as_deref().or(response_session_token) {
        session.insert(session_keys::WOO_SESSION, token).await?;
    }

    Ok(customer)
}

/// Replace the stored customer (after a profile change).
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn update_customer_session(
    session: &Session,
    customer: &CustomerSession,
) -> Result<(), AuthError> {
    session.insert(session_keys::CUSTOMER, customer).await?;
    Ok(())
}

/// Log out: forget the customer and their cart token.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn end_customer_session(session: &Session) -> Result<(), AuthError> {
    session
        .remove::<CustomerSession>(session_keys::CUSTOMER)
        .await?;
    session.remove::<String>(session_keys::WOO_SESSION).await?;
    session.remove_value(session_keys::ORDER_RECEIPT).await?;
    session.cycle_id().await?;
    Ok(())
}

/// Refresh the auth token if it is about to expire.
///
/// On refresh failure the customer is logged out and the error returned, so
/// the caller can send the browser to the login page.
///
/// # Errors
///
/// Returns [`AuthError::Refresh`] when the refresh token is rejected, or an
/// error if the session store fails.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn ensure_fresh(
    woo: &WooClient,
    session: &Session,
    mut customer: CustomerSession,
) -> Result<CustomerSession, AuthError> {
    if !customer.needs_refresh(now()) {
        return Ok(customer);
    }

    match woo.refresh_auth_token(&customer.refresh_token).await {
        Ok(auth_token) => {
            customer.auth_expires_at = decode_jwt_expiry(&auth_token);
            customer.auth_token = auth_token;
            session.insert(session_keys::CUSTOMER, &customer).await?;
            info!("Auth token refreshed");
            Ok(customer)
        }
        Err(e) => {
            warn!(error = %e, "Auth token refresh failed, logging out");
            end_customer_session(session).await?;
            Err(AuthError::Refresh(e))
        }
    }
}
