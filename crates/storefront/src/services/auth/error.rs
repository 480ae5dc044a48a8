//! Authentication error types.

use thiserror::Error;

use crate::woo::WooError;

/// Errors that can occur while managing the customer session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Session store read or write failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The refresh token was rejected or the API failed.
    #[error("token refresh failed: {0}")]
    Refresh(#[from] WooError),

    /// No customer in the session.
    #[error("not logged in")]
    NotLoggedIn,
}
