//! Page chrome: everything the base layout needs on every full page.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::warn;

use crate::models::Flash;
use crate::services::flash;
use crate::state::AppState;
use crate::woo::MenuItem;

use super::auth::request_path;
use super::{CspNonce, OptionalAuth};

/// Menu location rendered in the header.
pub const PRIMARY_MENU: &str = "PRIMARY";

/// Store title used when the API cannot provide one.
const FALLBACK_TITLE: &str = "Store";

/// Layout data for full-page templates.
#[derive(Debug, Clone)]
pub struct Chrome {
    /// CSP nonce for inline scripts.
    pub nonce: String,
    pub store_title: String,
    pub tagline: String,
    pub menu: Vec<MenuItem>,
    /// Display name of the logged-in customer.
    pub customer_name: Option<String>,
    pub ga4_measurement_id: Option<String>,
    /// Request path, for active-link styling and login `next` links.
    pub current_path: String,
    /// Notice queued by the previous request.
    pub flash: Option<Flash>,
}

impl Chrome {
    /// Whether a menu link points at the current page.
    #[must_use]
    pub fn is_current(&self, href: &str) -> bool {
        self.current_path == href
    }
}

impl FromRequestParts<AppState> for Chrome {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state).await?;
        let OptionalAuth(customer) = OptionalAuth::from_request_parts(parts, state).await?;

        // Both reads are cached; a failure only degrades the layout
        let (menu, settings) = tokio::join!(
            state.woo().get_menu(PRIMARY_MENU),
            state.woo().get_site_settings()
        );
        let menu = menu.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load primary menu");
            Vec::new()
        });
        let settings = settings.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load site settings");
            crate::woo::SiteSettings::default()
        });

        let store_title = if settings.title.trim().is_empty() {
            FALLBACK_TITLE.to_string()
        } else {
            settings.title
        };

        let flash = match parts.extensions.get::<Session>() {
            Some(session) => flash::take(session).await,
            None => None,
        };

        Ok(Self {
            nonce,
            store_title,
            tagline: settings.description,
            menu,
            customer_name: customer.map(|c| c.display_name),
            ga4_measurement_id: state.config().analytics.ga4_measurement_id.clone(),
            current_path: request_path(parts),
            flash,
        })
    }
}
