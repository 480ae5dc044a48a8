//! One-shot notices carried across a redirect.

use tower_sessions::Session;
use tracing::warn;

use crate::models::{Flash, session_keys};

/// Queue a notice for the next full page.
pub async fn set(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the pending notice, if any.
pub async fn take(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read flash message");
            None
        })
}
