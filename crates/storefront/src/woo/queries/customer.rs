//! Customer and account operations (`graphql/customer.graphql`).

use serde::{Deserialize, Serialize};
use woo_headless_core::OrderStatus;

use super::{
    AddressFields, AddressInput, LineItemFields, Nodes, OffsetPageInfoFields, OffsetPaginationInput,
    graphql_operation,
};

const DOCUMENT: &str = include_str!("../../../graphql/customer.graphql");

graphql_operation!(Login, login, DOCUMENT);
graphql_operation!(RegisterCustomer, register_customer, DOCUMENT);
graphql_operation!(RefreshAuthToken, refresh_auth_token, DOCUMENT);
graphql_operation!(GetCustomer, get_customer, DOCUMENT);
graphql_operation!(GetCustomerOrders, get_customer_orders, DOCUMENT);
graphql_operation!(GetOrder, get_order, DOCUMENT);
graphql_operation!(UpdateCustomer, update_customer, DOCUMENT);
graphql_operation!(SendPasswordResetEmail, send_password_reset_email, DOCUMENT);
graphql_operation!(ResetUserPassword, reset_user_password, DOCUMENT);

/// `CustomerFields` fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFields {
    pub database_id: Option<i32>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub billing: Option<AddressFields>,
    pub shipping: Option<AddressFields>,
}

/// `CustomerFields` plus the cart session token, as returned on login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedCustomer {
    #[serde(flatten)]
    pub fields: CustomerFields,
    pub session_token: Option<String>,
}

/// Payload of `login` and `registerCustomer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub auth_token: Option<String>,
    pub refresh_token: Option<String>,
    pub customer: Option<AuthenticatedCustomer>,
}

pub mod login {
    use super::{AuthPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: LoginInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct LoginInput {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub login: Option<AuthPayload>,
    }
}

pub mod register_customer {
    use super::{AuthPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: RegisterCustomerInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RegisterCustomerInput {
        pub email: String,
        pub username: String,
        pub password: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub first_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub last_name: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub register_customer: Option<AuthPayload>,
    }
}

pub mod refresh_auth_token {
    use super::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: RefreshJwtAuthTokenInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RefreshJwtAuthTokenInput {
        pub jwt_refresh_token: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub refresh_jwt_auth_token: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub auth_token: Option<String>,
    }
}

pub mod get_customer {
    use super::{CustomerFields, Deserialize};

    pub type Variables = super::super::NoVariables;

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub customer: Option<CustomerFields>,
    }
}

pub mod get_customer_orders {
    use super::{
        Deserialize, Nodes, OffsetPageInfoFields, OffsetPaginationInput, OrderStatus, Serialize,
    };

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        #[serde(rename = "where")]
        pub where_: OrderWhereArgs,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderWhereArgs {
        pub offset_pagination: OffsetPaginationInput,
        pub orderby: Vec<OrdersOrderby>,
    }

    #[derive(Debug, Clone, Copy, Serialize)]
    pub struct OrdersOrderby {
        pub field: &'static str,
        pub order: &'static str,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub customer: Option<Customer>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Customer {
        pub orders: Option<Orders>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Orders {
        #[serde(default)]
        pub page_info: OffsetPageInfoFields,
        #[serde(default)]
        pub nodes: Vec<OrderNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderNode {
        pub database_id: i32,
        pub order_number: Option<String>,
        pub date: Option<String>,
        pub status: Option<OrderStatus>,
        pub total: Option<String>,
        pub line_items: Option<Nodes<LineItemQuantity>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct LineItemQuantity {
        pub quantity: Option<i32>,
    }
}

/// Full order fields shared by `GetOrder` and `Checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFields {
    pub database_id: i32,
    pub order_number: Option<String>,
    pub order_key: Option<String>,
    pub date: Option<String>,
    pub status: Option<OrderStatus>,
    pub payment_method_title: Option<String>,
    pub customer_note: Option<String>,
    pub subtotal: Option<String>,
    pub discount_total: Option<String>,
    pub shipping_total: Option<String>,
    pub total_tax: Option<String>,
    pub total: Option<String>,
    pub customer: Option<OrderCustomer>,
    pub billing: Option<AddressFields>,
    pub shipping: Option<AddressFields>,
    pub line_items: Option<Nodes<LineItemFields>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub database_id: Option<i32>,
}

pub mod get_order {
    use super::{Deserialize, OrderFields, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub order: Option<OrderFields>,
    }
}

pub mod update_customer {
    use super::{AddressInput, CustomerFields, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: UpdateCustomerInput,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UpdateCustomerInput {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub first_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub last_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub display_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub email: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub password: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub billing: Option<AddressInput>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub shipping: Option<AddressInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub update_customer: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Payload {
        pub customer: Option<CustomerFields>,
    }
}

pub mod send_password_reset_email {
    use super::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: SendPasswordResetEmailInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct SendPasswordResetEmailInput {
        pub username: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub send_password_reset_email: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Payload {
        #[serde(default)]
        pub success: bool,
    }
}

pub mod reset_user_password {
    use super::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: ResetUserPasswordInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct ResetUserPasswordInput {
        pub key: String,
        pub login: String,
        pub password: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub reset_user_password: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Payload {
        pub user: Option<User>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        pub database_id: Option<i32>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_payload_flattens_customer() {
        let json = serde_json::json!({
            "login": {
                "authToken": "a.b.c",
                "refreshToken": "r.e.f",
                "customer": {
                    "databaseId": 5,
                    "email": "jo@example.com",
                    "displayName": "Jo",
                    "sessionToken": "s.e.s",
                    "billing": { "firstName": "Jo", "address1": "1 Main St" }
                }
            }
        });
        let data: login::ResponseData = serde_json::from_value(json).unwrap();
        let payload = data.login.unwrap();
        let customer = payload.customer.unwrap();
        assert_eq!(customer.fields.database_id, Some(5));
        assert_eq!(customer.session_token.as_deref(), Some("s.e.s"));
        assert_eq!(
            customer.fields.billing.unwrap().address_1.as_deref(),
            Some("1 Main St")
        );
    }

    #[test]
    fn test_update_customer_sends_only_changed_fields() {
        let vars = update_customer::Variables {
            input: update_customer::UpdateCustomerInput {
                first_name: Some("Jo".to_string()),
                ..Default::default()
            },
        };
        assert_eq!(
            serde_json::to_value(vars).unwrap(),
            serde_json::json!({ "input": { "firstName": "Jo" } })
        );
    }
}
