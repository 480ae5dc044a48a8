//! HTTP transport for the WooGraphQL endpoint.

use std::sync::Arc;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use tracing::debug;
use woo_headless_core::CurrencyCode;

use crate::config::WooConfig;

use super::cache::{CacheKey, CacheValue};
use super::{GraphQLError, GraphQLErrorLocation, WooError};

/// Header carrying the WooCommerce session token, in both directions.
pub const SESSION_HEADER: &str = "woocommerce-session";

/// Credentials attached to a single API call.
///
/// Both tokens are optional: catalog reads need neither, a guest cart needs
/// only the session token, account pages need the auth token.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext<'a> {
    /// WooCommerce session token identifying the cart.
    pub session_token: Option<&'a str>,
    /// Customer JWT issued by `login`/`registerCustomer`.
    pub auth_token: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// Build a context from optional tokens.
    #[must_use]
    pub const fn new(session_token: Option<&'a str>, auth_token: Option<&'a str>) -> Self {
        Self {
            session_token,
            auth_token,
        }
    }

    /// A context without credentials.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            session_token: None,
            auth_token: None,
        }
    }
}

/// Response data plus the session token the API answered with.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    /// Converted response data.
    pub data: T,
    /// Refreshed `woocommerce-session` token, when the API sent one.
    pub session_token: Option<String>,
}

impl<T> Envelope<T> {
    /// Transform the payload, keeping the session token.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            data: f(self.data),
            session_token: self.session_token,
        }
    }

    /// Fallible [`Envelope::map`].
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Envelope<U>, E> {
        Ok(Envelope {
            data: f(self.data)?,
            session_token: self.session_token,
        })
    }
}

/// Client for the WooCommerce GraphQL API.
///
/// Cheap to clone; the HTTP pool and cache are shared.
#[derive(Clone)]
pub struct WooClient {
    pub(super) inner: Arc<WooClientInner>,
}

pub(super) struct WooClientInner {
    client: reqwest::Client,
    endpoint: String,
    pub(super) currency: CurrencyCode,
    pub(super) cache: Cache<CacheKey, CacheValue>,
}

impl WooClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &WooConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .user_agent(concat!("woo-headless/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(WooClientInner {
                client,
                endpoint: config.graphql_url.to_string(),
                currency: config.currency,
                cache,
            }),
        }
    }

    /// Store currency used when parsing money strings.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.inner.currency
    }

    /// Execute a GraphQL operation.
    pub(super) async fn execute<Q: GraphQLQuery>(
        &self,
        ctx: &RequestContext<'_>,
        variables: Q::Variables,
    ) -> Result<Envelope<Q::ResponseData>, WooError> {
        let request_body = Q::build_query(variables);
        let operation = request_body.operation_name;

        let mut request = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body);

        if let Some(token) = ctx.session_token {
            request = request.header(SESSION_HEADER, format!("Session {token}"));
        }
        if let Some(token) = ctx.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(WooError::RateLimited(retry_after));
        }

        let session_token = session_token_from(response.headers());

        // Read as text first for better error diagnostics
        let response_text = response.text().await?;

        // WPGraphQL answers auth and validation failures with a 4xx and a
        // regular GraphQL error body; only fall back to the status line when
        // the body is not GraphQL.
        if !status.is_success()
            && serde_json::from_str::<Response<serde_json::Value>>(&response_text)
                .ok()
                .and_then(|r| r.errors)
                .is_none_or(|errors| errors.is_empty())
        {
            tracing::error!(
                operation,
                status = %status,
                body = %truncate(&response_text, 500),
                "WooGraphQL returned non-success status"
            );
            if status == reqwest::StatusCode::FORBIDDEN
                || status == reqwest::StatusCode::UNAUTHORIZED
            {
                return Err(WooError::Unauthorized(format!("HTTP {status}")));
            }
            return Err(WooError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                truncate(&response_text, 200)
            ))]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    operation,
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse WooGraphQL response"
                );
                return Err(WooError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(operation, errors = ?errors, "GraphQL errors in response");
            return Err(WooError::from_graphql(
                errors.into_iter().map(convert_error).collect(),
            ));
        }

        let data = response.data.ok_or_else(|| {
            tracing::error!(
                operation,
                body = %truncate(&response_text, 500),
                "WooGraphQL response has no data and no errors"
            );
            WooError::GraphQL(vec![GraphQLError::message("No data in response")])
        })?;

        Ok(Envelope {
            data,
            session_token,
        })
    }

    /// Execute an operation that needs no credentials and drop the envelope.
    pub(super) async fn query<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, WooError> {
        Ok(self
            .execute::<Q>(&RequestContext::anonymous(), variables)
            .await?
            .data)
    }
}

fn convert_error(e: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: e.message,
        locations: e.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: e.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}

/// Extract the session token from response headers.
///
/// WooGraphQL sends the bare JWT; tolerate a `Session ` prefix as well.
fn session_token_from(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(SESSION_HEADER)?.to_str().ok()?.trim();
    let token = raw.strip_prefix("Session ").unwrap_or(raw).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_session_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token_from(&headers), None);

        headers.insert(SESSION_HEADER, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(session_token_from(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(SESSION_HEADER, HeaderValue::from_static("Session abc.def.ghi"));
        assert_eq!(session_token_from(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(SESSION_HEADER, HeaderValue::from_static("  "));
        assert_eq!(session_token_from(&headers), None);
    }

    #[test]
    fn test_envelope_map_keeps_token() {
        let envelope = Envelope {
            data: 2,
            session_token: Some("tok".to_string()),
        };
        let mapped = envelope.map(|n| n * 10);
        assert_eq!(mapped.data, 20);
        assert_eq!(mapped.session_token.as_deref(), Some("tok"));

        let failed: Result<Envelope<i32>, &str> = mapped.try_map(|_| Err("nope"));
        assert_eq!(failed.unwrap_err(), "nope");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
