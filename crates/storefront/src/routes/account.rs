//! Customer account pages.
//!
//! Every handler takes [`RequireAuth`], so an anonymous visitor is sent to
//! the login page. When WooCommerce rejects the stored token mid-request the
//! customer is logged out the same way.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};
use woo_headless_core::OrderId;

use crate::catalog::{PageRequest, Pagination, PaginationView};
use crate::error::{AppError, Result, clear_sentry_user};
use crate::filters;
use crate::forms::{AccountDetailsForm, AddressForm, AddressKind, FieldErrors, FieldView};
use crate::middleware::{Chrome, RequireAuth, login_redirect};
use crate::models::{CustomerSession, Flash};
use crate::services::{auth, flash};
use crate::state::AppState;
use crate::woo::{Address, Customer, CustomerUpdate, Order, OrderSummary, WooError};

/// Orders listed per page.
pub const ORDERS_PER_PAGE: u32 = 10;

/// Orders shown on the dashboard.
const RECENT_ORDERS: u32 = 5;

const ACCOUNT_PATH: &str = "/account";

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub customer: Customer,
    /// Most recent orders.
    pub orders: Vec<OrderSummary>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub chrome: Chrome,
    pub orders: Vec<OrderSummary>,
    pub pagination: PaginationView,
}

/// Single order template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub chrome: Chrome,
    pub order: Order,
}

/// Both addresses, read-only.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub chrome: Chrome,
    pub billing: Address,
    pub shipping: Address,
}

/// Address edit form.
#[derive(Template, WebTemplate)]
#[template(path = "account/edit_address.html")]
pub struct EditAddressTemplate {
    pub chrome: Chrome,
    pub kind: &'static str,
    pub heading: &'static str,
    pub fields: Vec<FieldView>,
    pub error: Option<String>,
}

/// Account details form.
#[derive(Template, WebTemplate)]
#[template(path = "account/details.html")]
pub struct DetailsTemplate {
    pub chrome: Chrome,
    pub form: AccountDetailsForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// `?page=` on the order history.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<String>,
}

impl OrdersQuery {
    fn page(&self) -> Option<u32> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }
}

/// Turn a rejected token into a fresh login; pass everything else on.
async fn handle_woo_error(session: &Session, uri: &Uri, error: WooError) -> Result<Response> {
    match error {
        WooError::Unauthorized(reason) => {
            warn!(reason = %reason, "Customer token rejected, logging out");
            auth::end_customer_session(session).await?;
            clear_sentry_user();
            Ok(login_redirect(uri.path()).into_response())
        }
        other => Err(other.into()),
    }
}

/// Account dashboard: profile and recent orders.
#[instrument(skip_all, fields(customer_id = %auth.0.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    chrome: Chrome,
    auth: RequireAuth,
) -> Result<Response> {
    let ctx = auth.context();
    let (customer, orders) = tokio::join!(
        state.woo().get_customer(&ctx),
        state
            .woo()
            .get_customer_orders(&ctx, PageRequest::new(None, RECENT_ORDERS))
    );

    let customer = match customer {
        Ok(envelope) => envelope.data,
        Err(e) => return handle_woo_error(&session, &uri, e).await,
    };
    let orders = match orders {
        Ok(envelope) => envelope.data.orders,
        Err(e) => {
            warn!(error = %e, "Failed to load recent orders");
            Vec::new()
        }
    };

    Ok(DashboardTemplate {
        chrome,
        customer,
        orders,
    }
    .into_response())
}

/// Paginated order history.
#[instrument(skip_all, fields(customer_id = %auth.0.id))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    chrome: Chrome,
    auth: RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<Response> {
    let request = PageRequest::new(query.page(), ORDERS_PER_PAGE);
    let connection = match state.woo().get_customer_orders(&auth.context(), request).await {
        Ok(envelope) => envelope.data,
        Err(e) => return handle_woo_error(&session, &uri, e).await,
    };

    let pagination = Pagination::from_page_info(request, &connection.page_info);
    if let Some(last) = pagination.redirect_target() {
        return Ok(Redirect::to(&orders_href(last)).into_response());
    }

    Ok(OrdersTemplate {
        chrome,
        orders: connection.orders,
        pagination: pagination.view(orders_href),
    }
    .into_response())
}

fn orders_href(page: u32) -> String {
    if page <= 1 {
        "/account/orders".to_string()
    } else {
        format!("/account/orders?page={page}")
    }
}

/// One of the customer's orders. Other customers' orders are not found.
#[instrument(skip_all, fields(customer_id = %auth.0.id, order_id = %id))]
pub async fn order_detail(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    chrome: Chrome,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let not_found = || AppError::NotFound(format!("Order not found: {id}"));
    let order_id: OrderId = id.parse().map_err(|_| not_found())?;

    let order = match state.woo().get_order(&auth.context(), order_id).await {
        Ok(envelope) => envelope.data,
        Err(WooError::NotFound(_)) => return Err(not_found()),
        Err(e) => return handle_woo_error(&session, &uri, e).await,
    };

    if !is_owner(&order, &auth.0) {
        warn!("Order requested by another customer");
        return Err(not_found());
    }

    Ok(OrderTemplate { chrome, order }.into_response())
}

fn is_owner(order: &Order, customer: &CustomerSession) -> bool {
    order.customer_id == Some(customer.id)
}

/// Billing and shipping addresses.
#[instrument(skip_all, fields(customer_id = %auth.0.id))]
pub async fn addresses(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    chrome: Chrome,
    auth: RequireAuth,
) -> Result<Response> {
    let customer = match state.woo().get_customer(&auth.context()).await {
        Ok(envelope) => envelope.data,
        Err(e) => return handle_woo_error(&session, &uri, e).await,
    };

    Ok(AddressesTemplate {
        chrome,
        billing: customer.billing,
        shipping: customer.shipping,
    }
    .into_response())
}

fn address_kind(kind: &str) -> Result<AddressKind> {
    AddressKind::from_path(kind).ok_or_else(|| AppError::NotFound(format!("Address: {kind}")))
}

fn address_page(
    chrome: Chrome,
    kind: AddressKind,
    form: &AddressForm,
    errors: &FieldErrors,
    error: Option<String>,
) -> EditAddressTemplate {
    EditAddressTemplate {
        chrome,
        kind: kind.as_str(),
        heading: kind.label(),
        fields: form.fields(kind, "", errors),
        error,
    }
}

/// Edit one address.
#[instrument(skip_all, fields(customer_id = %auth.0.id, kind = %kind))]
pub async fn edit_address(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    chrome: Chrome,
    auth: RequireAuth,
    Path(kind): Path<String>,
) -> Result<Response> {
    let kind = address_kind(&kind)?;
    let customer = match state.woo().get_customer(&auth.context()).await {
        Ok(envelope) => envelope.data,
        Err(e) => return handle_woo_error(&session, &uri, e).await,
    };

    let form = AddressForm::from_address(match kind {
        AddressKind::Billing => &customer.billing,
        AddressKind::Shipping => &customer.shipping,
    });

    Ok(address_page(chrome, kind, &form, &FieldErrors::default(), None).into_response())
}

/// Save one address.
#[instrument(skip_all, fields(customer_id = %auth.0.id, kind = %kind))]
pub async fn update_address(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    chrome: Chrome,
    auth: RequireAuth,
    Path(kind): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let kind = address_kind(&kind)?;
    let address = match form.validate(kind) {
        Ok(address) => address,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                address_page(chrome, kind, &form, &errors, None),
            )
                .into_response());
        }
    };

    let update = match kind {
        AddressKind::Billing => CustomerUpdate {
            billing: Some(address),
            ..CustomerUpdate::default()
        },
        AddressKind::Shipping => CustomerUpdate {
            shipping: Some(address),
            ..CustomerUpdate::default()
        },
    };

    match state.woo().update_customer(&auth.context(), &update).await {
        Ok(_) => {
            info!("Address updated");
            flash::set(&session, Flash::info(format!("{} saved.", kind.label()))).await;
            Ok(Redirect::to("/account/addresses").into_response())
        }
        Err(e @ WooError::UserError(_)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            address_page(chrome, kind, &form, &FieldErrors::default(), e.user_message()),
        )
            .into_response()),
        Err(e) => handle_woo_error(&session, &uri, e).await,
    }
}

/// Edit name, email and password.
#[instrument(skip_all, fields(customer_id = %auth.0.id))]
pub async fn details(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    chrome: Chrome,
    auth: RequireAuth,
) -> Result<Response> {
    let customer = match state.woo().get_customer(&auth.context()).await {
        Ok(envelope) => envelope.data,
        Err(e) => return handle_woo_error(&session, &uri, e).await,
    };

    Ok(DetailsTemplate {
        chrome,
        form: AccountDetailsForm::from_customer(&customer),
        errors: FieldErrors::default(),
        error: None,
    }
    .into_response())
}

/// Save account details.
///
/// The session copy of the display name and email follows the change so
/// the header greeting stays current.
#[instrument(skip_all, fields(customer_id = %auth.0.id))]
pub async fn update_details(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    chrome: Chrome,
    auth: RequireAuth,
    Form(form): Form<AccountDetailsForm>,
) -> Result<Response> {
    let page = |form: AccountDetailsForm, errors: FieldErrors, error: Option<String>| {
        DetailsTemplate {
            chrome,
            form: AccountDetailsForm {
                password: String::new(),
                password_confirm: String::new(),
                ..form
            },
            errors,
            error,
        }
    };

    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => {
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page(form, errors, None)).into_response());
        }
    };

    match state.woo().update_customer(&auth.context(), &update).await {
        Ok(envelope) => {
            let updated = envelope.data;
            let RequireAuth(mut stored) = auth;
            if stored.display_name != updated.display_name || stored.email != updated.email {
                stored.display_name = updated.display_name;
                stored.email = updated.email;
                auth::update_customer_session(&session, &stored).await?;
            }
            info!(password_changed = update.password.is_some(), "Account details updated");
            flash::set(&session, Flash::info("Account details saved.")).await;
            Ok(Redirect::to(ACCOUNT_PATH).into_response())
        }
        Err(e @ WooError::UserError(_)) => {
            let message = e.user_message();
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                page(form, FieldErrors::default(), message),
            )
                .into_response())
        }
        Err(e) => handle_woo_error(&session, &uri, e).await,
    }
}

#[cfg(test)]
mod tests {
    use woo_headless_core::{CurrencyCode, CustomerId, OrderStatus, Price};

    use super::*;
    use crate::woo::OrderTotals;

    fn order(customer_id: Option<i32>) -> Order {
        let zero = Price::zero(CurrencyCode::USD);
        Order {
            id: OrderId::new(42),
            number: "42".to_string(),
            key: None,
            date: "May 1, 2024".to_string(),
            status: OrderStatus::Processing,
            payment_method_title: None,
            customer_note: None,
            customer_id: customer_id.map(CustomerId::new),
            totals: OrderTotals {
                subtotal: zero,
                discount: zero,
                shipping: zero,
                tax: zero,
                total: zero,
            },
            billing: Address::default(),
            shipping: Address::default(),
            line_items: Vec::new(),
        }
    }

    fn customer(id: i32) -> CustomerSession {
        CustomerSession {
            id: CustomerId::new(id),
            email: "ada@example.com".to_string(),
            display_name: "ada".to_string(),
            auth_token: "a".to_string(),
            refresh_token: "r".to_string(),
            auth_expires_at: None,
        }
    }

    #[test]
    fn test_only_owner_sees_order() {
        assert!(is_owner(&order(Some(7)), &customer(7)));
        assert!(!is_owner(&order(Some(8)), &customer(7)));
        assert!(!is_owner(&order(None), &customer(7)));
    }

    #[test]
    fn test_orders_href() {
        assert_eq!(orders_href(1), "/account/orders");
        assert_eq!(orders_href(3), "/account/orders?page=3");
    }

    #[test]
    fn test_orders_query_is_lenient() {
        let query = OrdersQuery {
            page: Some("two".to_string()),
        };
        assert_eq!(query.page(), None);
    }
}
