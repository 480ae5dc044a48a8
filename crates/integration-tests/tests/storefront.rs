//! End-to-end tests against the real storefront router and a fake
//! WooGraphQL backend.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use serde_json::Value;
use woo_headless_integration_tests::TestApp;
use woo_headless_storefront::middleware::SESSION_COOKIE_NAME;

fn location(resp: &reqwest::Response) -> &str {
    resp.headers().get(LOCATION).unwrap().to_str().unwrap()
}

// ============================================================================
// Health & Middleware
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::spawn().await;

    let resp = app.get("/health").await;
    let headers = resp.headers();

    let csp = headers
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.contains("nonce-"));
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/health"))
        .header("x-request-id", "req-from-proxy")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-from-proxy");
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_shop_lists_products() {
    let app = TestApp::spawn().await;

    let resp = app.get("/shop").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Hoodie"));
    assert!(body.contains("/product/beanie"));
    assert!(body.contains("Test Store"));
    assert!(app.woo.called("GetProducts"));
}

#[tokio::test]
async fn test_shop_page_past_the_end_redirects_to_last_page() {
    let app = TestApp::spawn().await;

    let resp = app.get("/shop?page=5&sort=price-asc").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/shop?sort=price-asc");
}

// ============================================================================
// Cart & Checkout
// ============================================================================

#[tokio::test]
async fn test_cart_count_without_session_is_empty() {
    let app = TestApp::spawn().await;

    let resp = app.get("/cart/count").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    // Empty badge; the stylesheet hides `#cart-count:empty`
    assert_eq!(body.trim(), "");
    // No WooCommerce session yet, so nothing to ask the backend
    assert!(!app.woo.called("GetCart"));
}

#[tokio::test]
async fn test_empty_checkout_redirects_to_cart() {
    let app = TestApp::spawn().await;

    let resp = app.get("/checkout").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/cart");
}

#[tokio::test]
async fn test_api_cart_starts_empty() {
    let app = TestApp::spawn().await;

    let resp = app.get("/api/cart").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.unwrap();
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
async fn test_api_cart_rejects_unknown_action() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/cart"))
        .header(CONTENT_TYPE, "application/json")
        .body(r#"{"action":"teleport"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

// ============================================================================
// Account
// ============================================================================

#[tokio::test]
async fn test_account_requires_login() {
    let app = TestApp::spawn().await;

    let resp = app.get("/account/orders").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/account/login?next=%2Faccount%2Forders");
}

#[tokio::test]
async fn test_login_page_renders() {
    let app = TestApp::spawn().await;

    let resp = app.get("/account/login").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"name="username""#));
    assert!(body.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::spawn().await;

    let form = HashMap::from([("username", "ada@example.com"), ("password", "wrong")]);
    let resp = app.post_form("/account/login", &form).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Incorrect email or password."));
    assert!(!body.contains("<strong>"));
}

#[tokio::test]
async fn test_login_with_blank_fields() {
    let app = TestApp::spawn().await;

    let resp = app.post_form("/account/login", &HashMap::new()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!app.woo.called("Login"));
}

#[tokio::test]
async fn test_login_starts_session() {
    let app = TestApp::spawn().await;

    let resp = app.login().await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/account");

    let cookie = resp
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE_NAME))
        .unwrap()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    // The session now carries the customer: the login page sends them on
    let resp = app.get("/account/login").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/account");
}

#[tokio::test]
async fn test_login_honours_local_next_only() {
    let app = TestApp::spawn().await;

    let form = HashMap::from([
        ("username", "ada@example.com"),
        ("password", "correct horse battery"),
        ("next", "//evil.example/phish"),
    ]);
    let resp = app.post_form("/account/login", &form).await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/account");
}
