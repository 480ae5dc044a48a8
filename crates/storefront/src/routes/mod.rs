//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Home page (featured products, categories)
//! GET  /health                             - Liveness check
//! GET  /health/ready                       - Readiness check (database)
//!
//! # Catalog
//! GET  /shop                               - Product listing (filters, sort, page)
//! GET  /product-category/{slug}            - Category listing
//! GET  /categories                         - All categories
//! GET  /product/{slug}                     - Product detail
//! GET  /product/{slug}/variation           - Variation status fragment (HTMX)
//! GET  /search                             - Search results page
//! GET  /search/suggest                     - Suggestion dropdown fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                               - Cart page
//! POST /cart/add                           - Add to cart (notice fragment, triggers cart-updated)
//! POST /cart/update                        - Set quantities (cart_items fragment)
//! POST /cart/remove                        - Remove a line (cart_items fragment)
//! POST /cart/empty                         - Remove every line
//! POST /cart/coupon                        - Apply a coupon
//! POST /cart/coupon/remove                 - Remove a coupon
//! POST /cart/shipping                      - Choose a shipping rate
//! GET  /cart/count                         - Cart count badge (fragment)
//!
//! # JSON API (rate limited)
//! GET  /api/cart                           - Current cart
//! POST /api/cart                           - Tagged cart action
//!
//! # Checkout
//! GET  /checkout                           - Checkout form (redirects to /cart when empty)
//! POST /checkout                           - Place the order
//! GET  /checkout/order-received/{number}   - Receipt
//!
//! # Account (auth POSTs rate limited)
//! GET  /account/login                      - Login page
//! POST /account/login                      - Login action
//! GET  /account/register                   - Register page
//! POST /account/register                   - Register action
//! POST /account/logout                     - Logout action
//! GET  /account/forgot-password            - Request a reset email
//! POST /account/forgot-password
//! GET  /account/reset-password             - Choose a new password (key + login in query)
//! POST /account/reset-password
//!
//! # Account (requires auth)
//! GET  /account                            - Dashboard
//! GET  /account/orders                     - Order history
//! GET  /account/orders/{id}                - Order detail
//! GET  /account/addresses                  - Billing and shipping addresses
//! GET  /account/addresses/{kind}           - Address form (billing|shipping)
//! POST /account/addresses/{kind}
//! GET  /account/details                    - Name, email and password
//! POST /account/details
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod health;
pub mod home;
pub mod products;
pub mod search;
pub mod shop;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Whether the request was made by htmx.
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/shop", get(shop::index))
        .route("/product-category/{slug}", get(shop::category))
        .route("/categories", get(categories::index))
        .route("/product/{slug}", get(products::show))
        .route("/product/{slug}/variation", get(products::variation))
        .route("/search", get(search::page))
        .route("/search/suggest", get(search::suggest))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/empty", post(cart::empty))
        .route("/coupon", post(cart::apply_coupon))
        .route("/coupon/remove", post(cart::remove_coupon))
        .route("/shipping", post(cart::select_shipping))
        .route("/count", get(cart::count))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(api::cart::show).post(api::cart::action))
        .layer(api_rate_limiter())
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/order-received/{number}", get(checkout::order_received))
}

/// Create the account routes router.
///
/// Only the credential-handling POSTs are rate limited; the pages and
/// logout are not.
pub fn account_routes() -> Router<AppState> {
    let limiter = auth_rate_limiter();

    Router::new()
        .route(
            "/login",
            post(auth::login)
                .layer(limiter.clone())
                .get(auth::login_page),
        )
        .route(
            "/register",
            post(auth::register)
                .layer(limiter.clone())
                .get(auth::register_page),
        )
        .route("/logout", post(auth::logout))
        .route(
            "/forgot-password",
            post(auth::forgot_password)
                .layer(limiter.clone())
                .get(auth::forgot_password_page),
        )
        .route(
            "/reset-password",
            post(auth::reset_password)
                .layer(limiter)
                .get(auth::reset_password_page),
        )
        .route("/", get(account::dashboard))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
        .route("/addresses", get(account::addresses))
        .route(
            "/addresses/{kind}",
            get(account::edit_address).post(account::update_address),
        )
        .route(
            "/details",
            get(account::details).post(account::update_details),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/api", api_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", axum::http::HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }
}
