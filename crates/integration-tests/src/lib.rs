//! Integration test harness for the storefront.
//!
//! Each test starts two servers on ephemeral ports:
//!
//! - a fake WooGraphQL endpoint that answers by `operationName` with canned
//!   JSON (see [`FakeWoo`])
//! - the real storefront router from [`app::build_router`], with an
//!   in-memory session store and a lazy (never connected) database pool
//!
//! The storefront is served with connect info so the rate limiters can key
//! on the peer address, exactly as in production.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p woo-headless-integration-tests
//! ```
//!
//! No database or WooCommerce install is needed.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use reqwest::redirect::Policy;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;
use url::Url;
use woo_headless_core::CurrencyCode;
use woo_headless_storefront::{
    app,
    config::{AnalyticsConfig, LogFormat, StorefrontConfig, WooConfig},
    middleware::create_session_layer,
    state::AppState,
};

/// Username and password the fake backend accepts.
pub const CUSTOMER_LOGIN: &str = "ada@example.com";
pub const CUSTOMER_PASSWORD: &str = "correct horse battery";

/// WooCommerce session token the fake backend hands out.
pub const WOO_SESSION_TOKEN: &str = "woo-session-1";

/// Products the fake catalog reports in total.
pub const CATALOG_TOTAL: u32 = 3;

/// A fake WooGraphQL server.
///
/// Unknown operations answer with a GraphQL error, which the storefront
/// treats as an upstream failure.
#[derive(Clone, Default)]
pub struct FakeWoo {
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeWoo {
    /// Operation names received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether `operation` was requested at least once.
    #[must_use]
    pub fn called(&self, operation: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == operation)
    }

    async fn serve(self) -> Url {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/graphql", post(graphql))
            .with_state(self);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/graphql")).unwrap()
    }
}

async fn graphql(
    State(fake): State<FakeWoo>,
    _headers: HeaderMap,
    Json(body): Json<Value>,
) -> (HeaderMap, Json<Value>) {
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    fake.calls.lock().unwrap().push(operation.clone());

    let mut headers = HeaderMap::new();
    let response = match operation.as_str() {
        "GetSiteSettings" => json!({
            "data": { "generalSettings": { "title": "Test Store", "description": "Fine goods" } }
        }),
        "GetMenu" => json!({ "data": { "menuItems": { "nodes": [] } } }),
        "GetCategories" => json!({ "data": { "productCategories": { "nodes": [] } } }),
        "GetProducts" => json!({
            "data": {
                "products": {
                    "pageInfo": {
                        "offsetPagination": {
                            "total": CATALOG_TOTAL,
                            "hasMore": false,
                            "hasPrevious": false
                        }
                    },
                    "nodes": [
                        product_card(1, "hoodie", "Hoodie", "45.00"),
                        product_card(2, "beanie", "Beanie", "18.00"),
                        product_card(3, "scarf", "Scarf", "22.50"),
                    ]
                }
            }
        }),
        "GetCart" => json!({ "data": { "cart": null } }),
        "Login" => login(&body["variables"]["input"], &mut headers),
        other => json!({
            "data": null,
            "errors": [{ "message": format!("Unknown operation {other}") }]
        }),
    };

    (headers, Json(response))
}

fn product_card(id: i32, slug: &str, name: &str, price: &str) -> Value {
    json!({
        "__typename": "SimpleProduct",
        "databaseId": id,
        "slug": slug,
        "name": name,
        "type": "SIMPLE",
        "onSale": false,
        "averageRating": 0.0,
        "reviewCount": 0,
        "shortDescription": null,
        "image": null,
        "price": price,
        "regularPrice": price,
        "stockStatus": "IN_STOCK"
    })
}

fn login(input: &Value, headers: &mut HeaderMap) -> Value {
    if input["username"] != CUSTOMER_LOGIN || input["password"] != CUSTOMER_PASSWORD {
        return json!({
            "data": { "login": null },
            "errors": [{ "message": "<strong>Error:</strong> The password you entered is incorrect." }]
        });
    }

    headers.insert(
        "woocommerce-session",
        format!("Session {WOO_SESSION_TOKEN}").parse().unwrap(),
    );
    json!({
        "data": {
            "login": {
                "authToken": "auth-token-1",
                "refreshToken": "refresh-token-1",
                "customer": {
                    "databaseId": 7,
                    "email": CUSTOMER_LOGIN,
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "displayName": "Ada",
                    "billing": null,
                    "shipping": null,
                    "sessionToken": WOO_SESSION_TOKEN
                }
            }
        }
    })
}

/// A running storefront wired to a [`FakeWoo`].
pub struct TestApp {
    /// Storefront origin, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    /// Client with a cookie store that does not follow redirects.
    pub client: reqwest::Client,
    /// The fake backend, for asserting which operations ran.
    pub woo: FakeWoo,
}

impl TestApp {
    /// Start the fake backend and the storefront.
    pub async fn spawn() -> Self {
        let woo = FakeWoo::default();
        let graphql_url = woo.clone().serve().await;

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let config = test_config(&base_url, graphql_url);
        // Never connected: only the readiness check touches the database.
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://storefront@127.0.0.1:1/storefront")
            .unwrap();

        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let router = app::build_router(AppState::new(config, pool), session_layer);

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .unwrap();

        Self {
            base_url,
            client,
            woo,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// POST a urlencoded form.
    pub async fn post_form(&self, path: &str, form: &HashMap<&str, &str>) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Log in as the fake backend's customer.
    pub async fn login(&self) -> reqwest::Response {
        let form = HashMap::from([
            ("username", CUSTOMER_LOGIN),
            ("password", CUSTOMER_PASSWORD),
        ]);
        self.post_form("/account/login", &form).await
    }
}

fn test_config(base_url: &str, graphql_url: Url) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://storefront@127.0.0.1:1/storefront"),
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        base_url: base_url.to_string(),
        session_secret: SecretString::from("kX9#mQ2$vL7@nR4&wT8*jF3!hB6^cZ1%"),
        woo: WooConfig {
            media_origin: graphql_url.origin().ascii_serialization(),
            graphql_url,
            currency: CurrencyCode::USD,
            products_per_page: 12,
            cache_ttl: Duration::from_secs(60),
        },
        analytics: AnalyticsConfig::default(),
        log_format: LogFormat::Pretty,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
