//! JSON cart API.
//!
//! `GET /api/cart` returns the cart. `POST /api/cart` takes one tagged
//! action and returns the cart after it:
//!
//! ```json
//! { "action": "add", "slug": "hoodie", "quantity": 2, "attributes": { "pa_color": "red" } }
//! { "action": "update", "key": "a1b2c3", "quantity": 3 }
//! { "action": "remove", "key": "a1b2c3" }
//! { "action": "empty" }
//! { "action": "apply_coupon", "code": "summer" }
//! { "action": "remove_coupon", "code": "summer" }
//! ```

use std::collections::HashMap;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use woo_headless_core::Quantity;

use crate::catalog::SelectedAttributes;
use crate::forms::CouponForm;
use crate::services::cart::{CartSession, resolve_line};
use crate::state::AppState;
use crate::woo::Cart;

use super::ApiError;

/// A cart mutation.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CartAction {
    Add {
        slug: String,
        #[serde(default)]
        quantity: Option<i64>,
        /// Attribute name → value, for variable products.
        #[serde(default)]
        attributes: HashMap<String, String>,
    },
    Update {
        key: String,
        quantity: i64,
    },
    Remove {
        key: String,
    },
    Empty,
    ApplyCoupon {
        code: String,
    },
    RemoveCoupon {
        code: String,
    },
}

/// Current cart.
///
/// # Errors
///
/// Returns an `ApiError` if the cart cannot be read.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Cart>, ApiError> {
    let mut cart_session = CartSession::load(&session).await;
    if !cart_session.has_cart() {
        return Ok(Json(Cart::empty(state.woo().currency())));
    }
    let envelope = state.woo().get_cart(&cart_session.context()).await?;
    Ok(Json(cart_session.persist(&session, envelope).await))
}

/// Apply one cart action.
///
/// Quantities below one are clamped to one, as in the HTML cart.
///
/// # Errors
///
/// 422 for selections, coupons and stock problems the shopper can fix;
/// otherwise the status of the underlying failure.
#[instrument(skip_all)]
pub async fn action(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<CartAction>, JsonRejection>,
) -> Result<Json<Cart>, ApiError> {
    let Json(action) = payload.map_err(|e| ApiError::new(e.status(), e.body_text()))?;
    let mut cart_session = CartSession::load(&session).await;
    let woo = state.woo();
    let ctx = cart_session.context();

    let result = match action {
        CartAction::Add {
            slug,
            quantity,
            attributes,
        } => {
            let product = woo.get_product_by_slug(slug.trim()).await?;
            let selected = SelectedAttributes::from_pairs(
                attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            );
            let quantity = quantity.map_or(Quantity::ONE, Quantity::clamped);
            let line = resolve_line(&product, &selected, quantity)
                .map_err(|e| ApiError::unprocessable(e.to_string()))?;
            woo.add_to_cart(&ctx, &line).await
        }
        CartAction::Update { key, quantity } => {
            woo.update_item_quantities(&ctx, &[(key, Quantity::clamped(quantity))])
                .await
        }
        CartAction::Remove { key } => woo.remove_items(&ctx, &[key]).await,
        CartAction::Empty => woo.empty_cart(&ctx).await,
        CartAction::ApplyCoupon { code } => {
            let code = CouponForm { code: Some(code) }.validate().map_err(|errors| {
                ApiError::unprocessable(errors.messages().next().unwrap_or_default())
            })?;
            woo.apply_coupon(&ctx, &code).await
        }
        CartAction::RemoveCoupon { code } => woo.remove_coupon(&ctx, code.trim()).await,
    };

    let envelope = result?;
    Ok(Json(cart_session.persist(&session, envelope).await))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_parse_from_tagged_json() {
        let add: CartAction = serde_json::from_str(
            r#"{"action":"add","slug":"hoodie","attributes":{"pa_color":"red"}}"#,
        )
        .unwrap();
        assert_eq!(
            add,
            CartAction::Add {
                slug: "hoodie".to_string(),
                quantity: None,
                attributes: HashMap::from([("pa_color".to_string(), "red".to_string())]),
            }
        );

        let empty: CartAction = serde_json::from_str(r#"{"action":"empty"}"#).unwrap();
        assert_eq!(empty, CartAction::Empty);

        let coupon: CartAction =
            serde_json::from_str(r#"{"action":"apply_coupon","code":"SUMMER"}"#).unwrap();
        assert_eq!(
            coupon,
            CartAction::ApplyCoupon {
                code: "SUMMER".to_string()
            }
        );

        assert!(serde_json::from_str::<CartAction>(r#"{"action":"explode"}"#).is_err());
    }
}
