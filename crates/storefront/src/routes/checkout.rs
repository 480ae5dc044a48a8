//! Checkout: the order form, placing the order and the receipt.
//!
//! Payment is entirely WooCommerce's: the `checkout` mutation either
//! completes the order or hands back a gateway URL to send the shopper to.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::origin_of;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::forms::{AddressForm, AddressKind, CheckoutForm, FieldErrors, FieldView};
use crate::middleware::{Chrome, OptionalAuth};
use crate::models::{CustomerSession, OrderReceipt, session_keys};
use crate::services::cart::CartSession;
use crate::state::AppState;
use crate::woo::{Cart, Order, PaymentGateway, RequestContext, WooError};

/// Where an empty cart sends the shopper.
const CART_PATH: &str = "/cart";

/// Payment option with selection state.
#[derive(Clone)]
pub struct GatewayOption {
    pub id: String,
    pub title: String,
    pub description: String,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub chrome: Chrome,
    pub cart: Cart,
    pub billing_fields: Vec<FieldView>,
    pub shipping_fields: Vec<FieldView>,
    pub ship_to_different_address: bool,
    pub gateways: Vec<GatewayOption>,
    pub payment_error: Option<String>,
    pub customer_note: String,
    pub note_error: Option<String>,
    /// Error from WooCommerce when placing the order.
    pub error: Option<String>,
    /// Number of invalid fields.
    pub error_count: usize,
}

impl CheckoutTemplate {
    fn new(
        chrome: Chrome,
        cart: Cart,
        form: &CheckoutForm,
        gateways: &[PaymentGateway],
        errors: &FieldErrors,
    ) -> Self {
        // Preselect the only gateway, or the first when nothing was chosen
        let chosen = if form.payment_method.is_empty() {
            gateways.first().map(|g| g.id.as_str()).unwrap_or_default()
        } else {
            form.payment_method.as_str()
        };

        Self {
            chrome,
            cart,
            billing_fields: form.billing.fields(AddressKind::Billing, "billing_", errors),
            shipping_fields: form.shipping.fields(AddressKind::Shipping, "shipping_", errors),
            ship_to_different_address: form.ship_to_different_address,
            gateways: gateways
                .iter()
                .map(|g| GatewayOption {
                    id: g.id.clone(),
                    title: g.title.clone(),
                    description: g.description.clone(),
                    selected: g.id == chosen,
                })
                .collect(),
            payment_error: errors.get("payment_method").map(ToString::to_string),
            customer_note: form.customer_note.clone(),
            note_error: errors.get("customer_note").map(ToString::to_string),
            error: None,
            error_count: errors.len(),
        }
    }
}

/// Order received page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/received.html")]
pub struct ReceivedTemplate {
    pub chrome: Chrome,
    pub order: Order,
}

/// The cart, or `None` when there is nothing to check out.
async fn non_empty_cart(
    state: &AppState,
    session: &Session,
    cart_session: &mut CartSession,
) -> Result<Option<Cart>> {
    if !cart_session.has_cart() {
        return Ok(None);
    }
    let envelope = state.woo().get_cart(&cart_session.context()).await?;
    let cart = cart_session.persist(session, envelope).await;
    Ok((!cart.is_empty()).then_some(cart))
}

/// Prefill from the logged-in customer's saved addresses.
///
/// Best effort: a stale token or API failure leaves the form blank.
async fn prefilled_form(state: &AppState, customer: Option<&CustomerSession>) -> CheckoutForm {
    let Some(customer) = customer else {
        return CheckoutForm::default();
    };
    if customer.needs_refresh(chrono::Utc::now().timestamp()) {
        return CheckoutForm::default();
    }

    let ctx = RequestContext::new(None, Some(&customer.auth_token));
    match state.woo().get_customer(&ctx).await {
        Ok(envelope) => {
            let saved = envelope.data;
            let mut billing = AddressForm::from_address(&saved.billing);
            if billing.email.is_empty() {
                billing.email.clone_from(&saved.email);
            }
            CheckoutForm {
                billing,
                shipping: AddressForm::from_address(&saved.shipping),
                ..CheckoutForm::default()
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to prefill checkout from customer");
            CheckoutForm {
                billing: AddressForm {
                    email: customer.email.clone(),
                    ..AddressForm::default()
                },
                ..CheckoutForm::default()
            }
        }
    }
}

/// Display the checkout form. An empty cart redirects to `/cart`.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    chrome: Chrome,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Response> {
    let mut cart_session = CartSession::load(&session).await;
    let Some(cart) = non_empty_cart(&state, &session, &mut cart_session).await? else {
        return Ok(Redirect::to(CART_PATH).into_response());
    };

    let (gateways, form) = tokio::join!(
        state.woo().get_payment_gateways(),
        prefilled_form(&state, customer.as_ref())
    );
    let gateways = gateways?;

    Ok(
        CheckoutTemplate::new(chrome, cart, &form, &gateways, &FieldErrors::default())
            .into_response(),
    )
}

/// Place the order.
///
/// Invalid forms re-render with field errors (422). On success the shopper
/// goes to an off-site gateway URL when there is one, otherwise to the
/// receipt page.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    chrome: Chrome,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response> {
    let mut cart_session = CartSession::load(&session).await;
    let Some(cart) = non_empty_cart(&state, &session, &mut cart_session).await? else {
        return Ok(Redirect::to(CART_PATH).into_response());
    };

    let gateways = state.woo().get_payment_gateways().await?;
    let form = CheckoutForm::from_fields(&fields);

    let request = match form.validate(&gateways) {
        Ok(request) => request,
        Err(errors) => {
            let page = CheckoutTemplate::new(chrome, cart, &form, &gateways, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let result = match state.woo().checkout(&cart_session.context(), &request).await {
        Ok(envelope) => cart_session.persist(&session, envelope).await,
        Err(e @ (WooError::UserError(_) | WooError::GraphQL(_))) => {
            warn!(error = %e, "Checkout rejected");
            let mut page =
                CheckoutTemplate::new(chrome, cart, &form, &gateways, &FieldErrors::default());
            page.error = Some(e.user_message().unwrap_or_else(|| {
                "We couldn't place your order. Please try again.".to_string()
            }));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let number = result.order.number.clone();
    info!(order_number = %number, "Order placed");
    add_breadcrumb("checkout", "Order placed", Some(&[("order", number.as_str())]));

    session
        .insert(
            session_keys::ORDER_RECEIPT,
            OrderReceipt {
                order: result.order,
            },
        )
        .await?;

    let woo = &state.config().woo;
    let api_origin = origin_of(&woo.graphql_url);
    let store_origins: Vec<&str> = [Some(woo.media_origin.as_str()), api_origin.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let location = order_location(result.redirect.as_deref(), &store_origins, &number);
    Ok(Redirect::to(&location).into_response())
}

/// WooCommerce's own thank-you page on the store's host.
fn is_store_receipt(url: &Url, store_origins: &[&str]) -> bool {
    url.path().contains("/order-received/")
        && origin_of(url).is_some_and(|origin| {
            store_origins
                .iter()
                .any(|store| store.trim_end_matches('/') == origin)
        })
}

/// Where to send the shopper after a successful checkout.
///
/// Gateway URLs are followed. The store's own order-received page (and
/// anything that is not an absolute URL) is replaced by the local receipt.
fn order_location(redirect: Option<&str>, store_origins: &[&str], number: &str) -> String {
    let receipt = || format!("/checkout/order-received/{}", urlencoding::encode(number));
    let Some(raw) = redirect.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return receipt();
    };
    match Url::parse(raw) {
        Ok(url) if !is_store_receipt(&url, store_origins) => raw.to_string(),
        _ => receipt(),
    }
}

/// Display the receipt for the order just placed.
///
/// Only the receipt stored in this session is shown; any other number is a 404.
#[instrument(skip(session, chrome))]
pub async fn order_received(
    session: Session,
    chrome: Chrome,
    Path(number): Path<String>,
) -> Result<ReceivedTemplate> {
    let receipt = session
        .get::<OrderReceipt>(session_keys::ORDER_RECEIPT)
        .await?
        .filter(|receipt| receipt.order.number == number)
        .ok_or_else(|| AppError::NotFound(format!("order {number}")))?;

    Ok(ReceivedTemplate {
        chrome,
        order: receipt.order,
    })
}

#[cfg(test)]
mod tests {
    use woo_headless_core::CurrencyCode;

    use super::*;

    fn gateways() -> Vec<PaymentGateway> {
        vec![
            PaymentGateway {
                id: "bacs".to_string(),
                title: "Bank transfer".to_string(),
                description: String::new(),
            },
            PaymentGateway {
                id: "cod".to_string(),
                title: "Cash on delivery".to_string(),
                description: String::new(),
            },
        ]
    }

    fn chrome() -> Chrome {
        Chrome {
            nonce: String::new(),
            store_title: "Store".to_string(),
            tagline: String::new(),
            menu: Vec::new(),
            customer_name: None,
            ga4_measurement_id: None,
            current_path: "/checkout".to_string(),
            flash: None,
        }
    }

    #[test]
    fn test_first_gateway_preselected() {
        let page = CheckoutTemplate::new(
            chrome(),
            Cart::empty(CurrencyCode::USD),
            &CheckoutForm::default(),
            &gateways(),
            &FieldErrors::default(),
        );
        let selected: Vec<_> = page.gateways.iter().filter(|g| g.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "bacs");
    }

    #[test]
    fn test_errors_reach_the_page() {
        let form = CheckoutForm {
            payment_method: "stripe".to_string(),
            ..CheckoutForm::default()
        };
        let Err(errors) = form.validate(&gateways()) else {
            panic!("blank checkout form should not validate");
        };
        let page = CheckoutTemplate::new(
            chrome(),
            Cart::empty(CurrencyCode::USD),
            &form,
            &gateways(),
            &errors,
        );

        assert!(page.gateways.iter().all(|g| !g.selected));
        assert_eq!(
            page.payment_error.as_deref(),
            Some("That payment method is not available.")
        );
        assert!(page.billing_fields.iter().any(|f| f.error.is_some()));
        assert!(page.shipping_fields.iter().all(|f| f.error.is_none()));
        assert_eq!(page.error_count, errors.len());
    }

    const STORE: &[&str] = &["https://shop.test", "https://api.shop.test/"];

    #[test]
    fn test_store_receipt_url_becomes_local_receipt() {
        let redirect = "https://shop.test/checkout/order-received/1042/?key=wc_order_abc";
        assert_eq!(
            order_location(Some(redirect), STORE, "1042"),
            "/checkout/order-received/1042"
        );
        assert_eq!(
            order_location(
                Some("https://api.shop.test/checkout/order-received/7/"),
                STORE,
                "7"
            ),
            "/checkout/order-received/7"
        );
        assert_eq!(
            order_location(None, STORE, "A 1"),
            "/checkout/order-received/A%201"
        );
        assert_eq!(
            order_location(Some("  "), STORE, "9"),
            "/checkout/order-received/9"
        );
    }

    #[test]
    fn test_gateway_redirect_is_followed() {
        let gateway = "https://pay.example.com/session/abc?return=order-received";
        assert_eq!(order_location(Some(gateway), STORE, "1042"), gateway);

        let off_site_receipt = "https://pay.example.com/checkout/order-received/1042/";
        assert_eq!(
            order_location(Some(off_site_receipt), STORE, "1042"),
            off_site_receipt
        );

        let store_payment_page = "https://shop.test/checkout/order-pay/1042/?pay_for_order=true";
        assert_eq!(
            order_location(Some(store_payment_page), STORE, "1042"),
            store_payment_page
        );
    }
}
