//! Customer, auth and order conversions.

use woo_headless_core::{CurrencyCode, CustomerId, OrderId};

use crate::woo::WooError;
use crate::woo::queries::customer::{AuthPayload, CustomerFields, OrderFields, get_customer_orders};
use crate::woo::queries::{AddressFields, AddressInput};
use crate::woo::types::{
    Address, AuthTokens, Customer, LoginResult, Order, OrderConnection, OrderLineItem,
    OrderSummary, OrderTotals,
};

use super::{convert_page_info, human_date, non_empty, price_or_zero};

fn convert_address(address: Option<AddressFields>) -> Address {
    let Some(a) = address else {
        return Address::default();
    };
    Address {
        first_name: a.first_name.unwrap_or_default(),
        last_name: a.last_name.unwrap_or_default(),
        company: a.company.unwrap_or_default(),
        address_1: a.address_1.unwrap_or_default(),
        address_2: a.address_2.unwrap_or_default(),
        city: a.city.unwrap_or_default(),
        state: a.state.unwrap_or_default(),
        postcode: a.postcode.unwrap_or_default(),
        country: a.country.unwrap_or_default(),
        email: a.email.unwrap_or_default(),
        phone: a.phone.unwrap_or_default(),
    }
}

/// Convert an address into mutation input.
#[must_use]
pub fn convert_address_input(address: &Address, include_email: bool) -> AddressInput {
    AddressInput {
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        company: address.company.clone(),
        address_1: address.address_1.clone(),
        address_2: address.address_2.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        postcode: address.postcode.clone(),
        country: address.country.clone(),
        email: include_email.then(|| address.email.clone()),
        phone: address.phone.clone(),
        overwrite: None,
    }
}

/// Convert a customer. Guests (no database id) are not customers.
pub fn convert_customer(customer: CustomerFields) -> Option<Customer> {
    let id = customer.database_id.filter(|id| *id > 0)?;
    let first_name = customer.first_name.unwrap_or_default();
    let email = customer.email.unwrap_or_default();
    let display_name = non_empty(customer.display_name)
        .or_else(|| non_empty(Some(first_name.clone())))
        .unwrap_or_else(|| email.clone());

    Some(Customer {
        id: CustomerId::new(id),
        email,
        first_name,
        last_name: customer.last_name.unwrap_or_default(),
        display_name,
        billing: convert_address(customer.billing),
        shipping: convert_address(customer.shipping),
    })
}

/// Convert a `login`/`registerCustomer` payload.
///
/// # Errors
///
/// Returns [`WooError::UserError`] when tokens or customer are missing.
pub fn convert_auth_payload(payload: Option<AuthPayload>) -> Result<LoginResult, WooError> {
    let payload =
        payload.ok_or_else(|| WooError::UserError("Authentication failed".to_string()))?;

    let (Some(auth_token), Some(refresh_token)) = (
        non_empty(payload.auth_token),
        non_empty(payload.refresh_token),
    ) else {
        return Err(WooError::UserError(
            "Authentication did not return a token".to_string(),
        ));
    };

    let authenticated = payload
        .customer
        .ok_or_else(|| WooError::UserError("Authentication did not return a customer".to_string()))?;
    let session_token = non_empty(authenticated.session_token);
    let customer = convert_customer(authenticated.fields)
        .ok_or_else(|| WooError::UserError("Authentication did not return a customer".to_string()))?;

    Ok(LoginResult {
        tokens: AuthTokens {
            auth_token,
            refresh_token,
        },
        customer,
        session_token,
    })
}

/// Convert a page of order history.
pub fn convert_order_connection(
    orders: Option<get_customer_orders::Orders>,
    currency: CurrencyCode,
) -> OrderConnection {
    let Some(orders) = orders else {
        return OrderConnection {
            orders: Vec::new(),
            page_info: super::OffsetPageInfo::default(),
        };
    };

    OrderConnection {
        orders: orders
            .nodes
            .into_iter()
            .map(|order| OrderSummary {
                id: OrderId::new(order.database_id),
                number: non_empty(order.order_number)
                    .unwrap_or_else(|| order.database_id.to_string()),
                date: human_date(order.date.as_deref()),
                status: order.status.unwrap_or_default(),
                total: price_or_zero(order.total.as_deref(), currency),
                item_count: order
                    .line_items
                    .map(|items| items.nodes)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|item| item.quantity)
                    .filter_map(|q| u32::try_from(q).ok())
                    .sum(),
            })
            .collect(),
        page_info: convert_page_info(orders.page_info),
    }
}

/// Convert a full order.
pub fn convert_order(order: OrderFields, currency: CurrencyCode) -> Order {
    let line_items = order
        .line_items
        .map(|items| items.nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            let product = item.product.and_then(|p| p.node);
            OrderLineItem {
                name: product
                    .as_ref()
                    .and_then(|p| p.name.clone())
                    .unwrap_or_else(|| "Item".to_string()),
                slug: product.and_then(|p| non_empty(p.slug)),
                variation_name: item
                    .variation
                    .and_then(|v| v.node)
                    .and_then(|v| non_empty(v.name)),
                quantity: item
                    .quantity
                    .and_then(|q| u32::try_from(q).ok())
                    .unwrap_or_default(),
                total: price_or_zero(item.total.as_deref(), currency),
            }
        })
        .collect();

    Order {
        id: OrderId::new(order.database_id),
        number: non_empty(order.order_number).unwrap_or_else(|| order.database_id.to_string()),
        key: non_empty(order.order_key),
        date: human_date(order.date.as_deref()),
        status: order.status.unwrap_or_default(),
        payment_method_title: non_empty(order.payment_method_title),
        customer_note: non_empty(order.customer_note),
        customer_id: order
            .customer
            .and_then(|c| c.database_id)
            .filter(|id| *id > 0)
            .map(CustomerId::new),
        totals: OrderTotals {
            subtotal: price_or_zero(order.subtotal.as_deref(), currency),
            discount: price_or_zero(order.discount_total.as_deref(), currency),
            shipping: price_or_zero(order.shipping_total.as_deref(), currency),
            tax: price_or_zero(order.total_tax.as_deref(), currency),
            total: price_or_zero(order.total.as_deref(), currency),
        },
        billing: convert_address(order.billing),
        shipping: convert_address(order.shipping),
        line_items,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use woo_headless_core::OrderStatus;

    #[test]
    fn test_auth_payload_requires_tokens() {
        let payload: AuthPayload = serde_json::from_value(serde_json::json!({
            "authToken": "",
            "refreshToken": "r",
            "customer": { "databaseId": 1 }
        }))
        .unwrap();
        assert!(matches!(
            convert_auth_payload(Some(payload)),
            Err(WooError::UserError(_))
        ));
        assert!(convert_auth_payload(None).is_err());
    }

    #[test]
    fn test_auth_payload_success() {
        let payload: AuthPayload = serde_json::from_value(serde_json::json!({
            "authToken": "a",
            "refreshToken": "r",
            "customer": {
                "databaseId": 12,
                "email": "jo@example.com",
                "firstName": "Jo",
                "displayName": "",
                "sessionToken": "s"
            }
        }))
        .unwrap();
        let result = convert_auth_payload(Some(payload)).unwrap();
        assert_eq!(result.customer.id, CustomerId::new(12));
        assert_eq!(result.customer.display_name, "Jo");
        assert_eq!(result.session_token.as_deref(), Some("s"));
        assert_eq!(result.tokens.auth_token, "a");
    }

    #[test]
    fn test_guest_is_not_a_customer() {
        let fields: CustomerFields =
            serde_json::from_value(serde_json::json!({ "databaseId": 0, "email": null })).unwrap();
        assert!(convert_customer(fields).is_none());
    }

    #[test]
    fn test_convert_order() {
        let fields: OrderFields = serde_json::from_value(serde_json::json!({
            "databaseId": 55,
            "orderNumber": "55",
            "date": "2024-03-02T10:00:00",
            "status": "COMPLETED",
            "total": "30.00",
            "subtotal": "30.00",
            "customer": { "databaseId": 12 },
            "billing": { "firstName": "Jo", "email": "jo@example.com" },
            "lineItems": { "nodes": [
                { "quantity": 2, "total": "30.00",
                  "product": { "node": { "name": "Tee", "slug": "tee" } },
                  "variation": { "node": { "name": "Tee - Red" } } }
            ]}
        }))
        .unwrap();
        let order = convert_order(fields, CurrencyCode::USD);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.date, "March 2, 2024");
        assert_eq!(order.customer_id, Some(CustomerId::new(12)));
        assert_eq!(order.billing.email, "jo@example.com");
        assert_eq!(order.line_items[0].variation_name.as_deref(), Some("Tee - Red"));
        assert_eq!(order.totals.total.display(), "$30.00");
    }

    #[test]
    fn test_address_input_email_only_when_asked() {
        let address = Address {
            email: "jo@example.com".to_string(),
            ..Address::default()
        };
        assert!(convert_address_input(&address, false).email.is_none());
        assert_eq!(
            convert_address_input(&address, true).email.as_deref(),
            Some("jo@example.com")
        );
    }
}
