//! Authentication extractors.
//!
//! The customer's JWTs live in the session. [`RequireAuth`] refreshes the
//! auth token shortly before it expires; when that fails the customer is
//! logged out and sent to the login page.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::warn;

use crate::models::CustomerSession;
use crate::services::auth::{self, AuthError};
use crate::state::AppState;
use crate::woo::RequestContext;

/// Login page path.
pub const LOGIN_PATH: &str = "/account/login";

/// Extractor that requires a logged-in customer with a fresh auth token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", customer.display_name)
/// }
/// ```
pub struct RequireAuth(pub CustomerSession);

impl RequireAuth {
    /// Credentials for account calls. The cart token is not needed.
    #[must_use]
    pub fn context(&self) -> RequestContext<'_> {
        RequestContext::new(None, Some(&self.0.auth_token))
    }
}

/// Error returned when authentication is required but the customer is not logged in.
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next`.
    RedirectToLogin { next: String },
    /// Session store failure.
    SessionUnavailable,
}

/// Full request path, including the prefix of any `nest` the handler sits
/// under.
pub(crate) fn request_path(parts: &Parts) -> String {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |OriginalUri(uri)| uri.path())
        .to_string()
}

/// Login URL that returns to `next` afterwards.
#[must_use]
pub fn login_redirect(next: &str) -> Redirect {
    Redirect::to(&format!("{LOGIN_PATH}?next={}", urlencoding::encode(next)))
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => login_redirect(&next).into_response(),
            Self::SessionUnavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let next = request_path(parts);

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::SessionUnavailable)?;

        let customer = auth::current_customer(&session)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to read customer session");
                AuthRejection::SessionUnavailable
            })?
            .ok_or_else(|| AuthRejection::RedirectToLogin { next: next.clone() })?;

        match auth::ensure_fresh(state.woo(), &session, customer).await {
            Ok(customer) => Ok(Self(customer)),
            Err(AuthError::Session(e)) => {
                warn!(error = %e, "Failed to update customer session");
                Err(AuthRejection::SessionUnavailable)
            }
            Err(_) => Err(AuthRejection::RedirectToLogin { next }),
        }
    }
}

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireAuth`, this does not reject the request if the customer is
/// not logged in, and does not refresh tokens.
pub struct OptionalAuth(pub Option<CustomerSession>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => auth::current_customer(session).await.ok().flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_redirects_to_login() {
        let response = AuthRejection::RedirectToLogin {
            next: "/account/orders".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").and_then(|v| v.to_str().ok()),
            Some("/account/login?next=%2Faccount%2Forders")
        );
    }

    #[test]
    fn test_request_path_keeps_nest_prefix() {
        // Inside `.nest("/account", ..)` the URI is stripped to `/orders`
        let (parts, ()) = axum::http::Request::builder()
            .uri("/orders?page=2")
            .extension(OriginalUri("/account/orders?page=2".parse().unwrap()))
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(request_path(&parts), "/account/orders");

        let (parts, ()) = axum::http::Request::builder()
            .uri("/shop")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(request_path(&parts), "/shop");
    }
}
