//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. The CSP is built per
//! request so it can carry the request's nonce and the configured media
//! origin.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;
use crate::state::AppState;

/// Origin htmx is loaded from.
pub const HTMX_ORIGIN: &str = "https://unpkg.com";

const GA4_SCRIPT_ORIGIN: &str = "https://www.googletagmanager.com";
const GA4_CONNECT_ORIGINS: &str =
    "https://www.google-analytics.com https://region1.google-analytics.com";

/// Build the `Content-Security-Policy` value.
///
/// ```text
/// default-src 'none';
/// script-src 'self' 'nonce-…' https://unpkg.com [googletagmanager];
/// style-src 'self';
/// font-src 'self';
/// img-src 'self' data: <media origin>;
/// connect-src 'self' [google-analytics];
/// frame-src 'none';
/// object-src 'none';
/// base-uri 'self';
/// form-action 'self' <media origin>;
/// frame-ancestors 'none';
/// upgrade-insecure-requests
/// ```
#[must_use]
pub fn content_security_policy(nonce: &str, media_origin: &str, analytics: bool) -> String {
    let mut script_src = format!("'self' 'nonce-{nonce}' {HTMX_ORIGIN}");
    let mut connect_src = String::from("'self'");
    if analytics {
        script_src.push(' ');
        script_src.push_str(GA4_SCRIPT_ORIGIN);
        connect_src.push(' ');
        connect_src.push_str(GA4_CONNECT_ORIGINS);
    }

    format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' data: {media_origin}; \
         connect-src {connect_src}; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self' {media_origin}; \
         frame-ancestors 'none'; \
         upgrade-insecure-requests"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: strict-origin-when-cross-origin` - Keep paths private
///   off-site
/// - `Content-Security-Policy` - see [`content_security_policy`]
/// - `Permissions-Policy` - Deny all sensitive features
/// - `Cache-Control: no-store, max-age=0` - Unless the handler set its own
/// - `Cross-Origin-Opener-Policy: same-origin` - Process isolation
/// - `Cross-Origin-Resource-Policy: same-origin` - Resource isolation
/// - `Cross-Origin-Embedder-Policy: credentialless` - Product images come
///   from the WordPress host, which does not send CORP headers
/// - `X-DNS-Prefetch-Control: off` - Prevent DNS prefetch leakage
///
/// Must run inside `csp_nonce_middleware` so the nonce is in the request
/// extensions.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_string())
        .unwrap_or_default();

    let mut response = next.run(request).await;

    let config = state.config();
    let csp = content_security_policy(
        &nonce,
        &config.woo.media_origin,
        config.analytics.ga4_measurement_id.is_some(),
    );

    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&csp) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid CSP header value, check WOO_MEDIA_ORIGIN");
        }
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             ambient-light-sensor=(), \
             autoplay=(), \
             battery=(), \
             browsing-topics=(), \
             camera=(), \
             display-capture=(), \
             document-domain=(), \
             encrypted-media=(), \
             fullscreen=(), \
             geolocation=(), \
             gyroscope=(), \
             hid=(), \
             idle-detection=(), \
             interest-cohort=(), \
             magnetometer=(), \
             microphone=(), \
             midi=(), \
             payment=(), \
             picture-in-picture=(), \
             publickey-credentials-get=(), \
             screen-wake-lock=(), \
             serial=(), \
             usb=(), \
             xr-spatial-tracking=()",
        ),
    );

    // Static assets set their own long-lived policy
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );
    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_carries_nonce_and_media_origin() {
        let csp = content_security_policy("abc123", "https://shop.test", false);
        assert!(csp.contains("script-src 'self' 'nonce-abc123' https://unpkg.com;"));
        assert!(csp.contains("img-src 'self' data: https://shop.test;"));
        assert!(csp.contains("connect-src 'self';"));
        // Off-site payment redirects land on the WordPress host
        assert!(csp.contains("form-action 'self' https://shop.test;"));
        assert!(!csp.contains("googletagmanager"));
    }

    #[test]
    fn test_csp_allows_analytics_when_configured() {
        let csp = content_security_policy("n", "https://shop.test", true);
        assert!(csp.contains("https://www.googletagmanager.com"));
        assert!(csp.contains("https://www.google-analytics.com"));
    }
}
