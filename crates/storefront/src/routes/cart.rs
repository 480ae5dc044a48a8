//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads;
//! each mutation answers with the `cart_items` fragment (or the count badge
//! for add-to-cart) and triggers `cart-updated` so the header badge
//! revalidates. Without HTMX the same endpoints redirect back to `/cart`
//! with a flash notice.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::catalog::SelectedAttributes;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::forms::{CouponForm, parse_quantity};
use crate::middleware::Chrome;
use crate::models::Flash;
use crate::services::cart::{CartSession, resolve_line};
use crate::services::flash;
use crate::state::AppState;
use crate::woo::{Cart, Envelope, WooError};

use super::is_htmx;

/// Event that makes the count badge revalidate.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Shown when the API fails without a customer-facing message.
const GENERIC_CART_ERROR: &str = "We couldn't update your cart. Please try again.";

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/cart.html")]
pub struct CartTemplate {
    pub chrome: Chrome,
    pub cart: Cart,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: Cart,
    /// Error from the action that produced this fragment.
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Inline notice fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/notice.html")]
pub struct NoticeTemplate {
    pub message: String,
    pub is_error: bool,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub key: String,
    pub quantity: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub key: String,
}

/// Remove coupon form data.
#[derive(Debug, Deserialize)]
pub struct RemoveCouponForm {
    pub code: String,
}

/// Choose shipping form data.
#[derive(Debug, Deserialize)]
pub struct ShippingForm {
    pub rate_id: String,
}

/// Customer-facing text for a failed cart call.
fn cart_error_message(error: &WooError) -> String {
    error
        .user_message()
        .unwrap_or_else(|| GENERIC_CART_ERROR.to_string())
}

/// Read the current cart, or an empty one for shoppers without a cart.
async fn current_cart(
    state: &AppState,
    session: &Session,
    cart_session: &mut CartSession,
) -> std::result::Result<Cart, WooError> {
    if !cart_session.has_cart() {
        return Ok(Cart::empty(state.woo().currency()));
    }
    let envelope = state.woo().get_cart(&cart_session.context()).await?;
    Ok(cart_session.persist(session, envelope).await)
}

/// Answer a cart mutation.
///
/// HTMX gets the refreshed `cart_items` fragment; a failed mutation
/// re-reads the cart and shows the error above it. Plain forms redirect to
/// the cart page with a flash notice.
async fn cart_response(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    mut cart_session: CartSession,
    result: std::result::Result<Envelope<Cart>, WooError>,
    success: &str,
) -> Response {
    let (cart, error) = match result {
        Ok(envelope) => (Some(cart_session.persist(session, envelope).await), None),
        Err(e) => {
            warn!(error = %e, "Cart update failed");
            (None, Some(cart_error_message(&e)))
        }
    };

    if !is_htmx(headers) {
        let notice = error.map_or_else(|| Flash::info(success), Flash::error);
        flash::set(session, notice).await;
        return Redirect::to("/cart").into_response();
    }

    let cart = match cart {
        Some(cart) => cart,
        None => current_cart(state, session, &mut cart_session)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to re-read cart");
                Cart::empty(state.woo().currency())
            }),
    };

    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartItemsTemplate { cart, error },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    chrome: Chrome,
) -> Result<CartTemplate> {
    let mut cart_session = CartSession::load(&session).await;
    let cart = current_cart(&state, &session, &mut cart_session).await?;
    Ok(CartTemplate { chrome, cart })
}

/// Add item to cart.
///
/// The form carries the product `slug`, an optional `quantity` and, for
/// variable products, `attribute_<name>` selections. HTMX gets a notice
/// fragment; success also triggers `cart-updated`.
#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response> {
    let slug = form.get("slug").map(|s| s.trim()).unwrap_or_default();
    if slug.is_empty() {
        return Err(AppError::BadRequest("missing product".to_string()));
    }
    let product_path = format!("/product/{slug}");

    let product = state.woo().get_product_by_slug(slug).await?;
    let quantity = parse_quantity(form.get("quantity").map(String::as_str));
    let selected = SelectedAttributes::from_form(&form);

    let line = match resolve_line(&product, &selected, quantity) {
        Ok(line) => line,
        Err(e) => {
            if is_htmx(&headers) {
                return Ok(NoticeTemplate {
                    message: e.to_string(),
                    is_error: true,
                }
                .into_response());
            }
            flash::set(&session, Flash::error(e.to_string())).await;
            return Ok(Redirect::to(&product_path).into_response());
        }
    };

    let mut cart_session = CartSession::load(&session).await;
    let result = state.woo().add_to_cart(&cart_session.context(), &line).await;

    match result {
        Ok(envelope) => {
            cart_session.persist(&session, envelope).await;
            add_breadcrumb("cart", "Added to cart", Some(&[("product", slug)]));
            let message = format!("{} has been added to your cart.", product.summary.name);

            if is_htmx(&headers) {
                Ok((
                    AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
                    NoticeTemplate {
                        message,
                        is_error: false,
                    },
                )
                    .into_response())
            } else {
                flash::set(&session, Flash::info(message)).await;
                Ok(Redirect::to("/cart").into_response())
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to add item to cart");
            let message = cart_error_message(&e);
            if is_htmx(&headers) {
                Ok(NoticeTemplate {
                    message,
                    is_error: true,
                }
                .into_response())
            } else {
                flash::set(&session, Flash::error(message)).await;
                Ok(Redirect::to(&product_path).into_response())
            }
        }
    }
}

/// Update a line's quantity. Below one is clamped to one.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let cart_session = CartSession::load(&session).await;
    let quantity = parse_quantity(form.quantity.as_deref());
    let result = state
        .woo()
        .update_item_quantities(&cart_session.context(), &[(form.key, quantity)])
        .await;
    cart_response(&state, &session, &headers, cart_session, result, "Cart updated.").await
}

/// Remove a line.
#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let cart_session = CartSession::load(&session).await;
    let result = state
        .woo()
        .remove_items(&cart_session.context(), &[form.key])
        .await;
    cart_response(&state, &session, &headers, cart_session, result, "Item removed.").await
}

/// Remove every line.
#[instrument(skip_all)]
pub async fn empty(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let cart_session = CartSession::load(&session).await;
    let result = state.woo().empty_cart(&cart_session.context()).await;
    cart_response(&state, &session, &headers, cart_session, result, "Your cart is now empty.").await
}

/// Apply a coupon code.
#[instrument(skip_all)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CouponForm>,
) -> Response {
    let cart_session = CartSession::load(&session).await;
    let result = match form.validate() {
        Ok(code) => {
            state
                .woo()
                .apply_coupon(&cart_session.context(), &code)
                .await
        }
        Err(errors) => Err(WooError::UserError(
            errors.messages().next().unwrap_or_default().to_string(),
        )),
    };
    cart_response(&state, &session, &headers, cart_session, result, "Coupon applied.").await
}

/// Remove a coupon code.
#[instrument(skip_all)]
pub async fn remove_coupon(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveCouponForm>,
) -> Response {
    let cart_session = CartSession::load(&session).await;
    let result = state
        .woo()
        .remove_coupon(&cart_session.context(), form.code.trim())
        .await;
    cart_response(&state, &session, &headers, cart_session, result, "Coupon removed.").await
}

/// Choose a shipping rate.
#[instrument(skip_all)]
pub async fn select_shipping(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ShippingForm>,
) -> Response {
    let cart_session = CartSession::load(&session).await;
    let result = state
        .woo()
        .select_shipping_method(&cart_session.context(), &form.rate_id)
        .await;
    cart_response(&state, &session, &headers, cart_session, result, "Shipping updated.").await
}

/// Get cart count badge (HTMX).
///
/// Polled every 30 seconds and on `cart-updated`; failures show zero.
#[instrument(skip_all)]
pub async fn count(State(state): State<AppState>, session: Session) -> CartCountTemplate {
    let mut cart_session = CartSession::load(&session).await;
    let count = current_cart(&state, &session, &mut cart_session)
        .await
        .map(|cart| cart.item_count)
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read cart count");
            0
        });
    CartCountTemplate { count }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_count_badge_is_empty_for_empty_cart() {
        assert_eq!(CartCountTemplate { count: 0 }.render().unwrap(), "");
        assert_eq!(CartCountTemplate { count: 3 }.render().unwrap(), "3");
    }

    #[test]
    fn test_cart_error_message() {
        let rejected = WooError::UserError("Coupon \"x\" does not exist!".to_string());
        assert_eq!(cart_error_message(&rejected), "Coupon \"x\" does not exist!");

        let broken = WooError::Parse(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(cart_error_message(&broken), GENERIC_CART_ERROR);
    }
}
