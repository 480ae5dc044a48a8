//! Checkout operations (`graphql/checkout.graphql`).

use serde::{Deserialize, Serialize};

use super::{AddressInput, graphql_operation};
use super::customer::OrderFields;

const DOCUMENT: &str = include_str!("../../../graphql/checkout.graphql");

graphql_operation!(GetPaymentGateways, get_payment_gateways, DOCUMENT);
graphql_operation!(Checkout, checkout, DOCUMENT);

pub mod get_payment_gateways {
    use super::Deserialize;
    use super::super::Nodes;

    pub type Variables = super::super::NoVariables;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub payment_gateways: Option<Nodes<Gateway>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Gateway {
        pub id: String,
        pub title: Option<String>,
        pub description: Option<String>,
    }
}

pub mod checkout {
    use super::{AddressInput, Deserialize, OrderFields, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CheckoutInput,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CheckoutInput {
        pub payment_method: String,
        pub billing: AddressInput,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub shipping: Option<AddressInput>,
        pub ship_to_different_address: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub customer_note: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub shipping_method: Vec<String>,
        /// Leave payment to the gateway's redirect flow.
        pub is_paid: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub checkout: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Payload {
        pub result: Option<String>,
        pub redirect: Option<String>,
        pub order: Option<OrderFields>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_payload_accepts_partial_order() {
        let json = serde_json::json!({
            "checkout": {
                "result": "success",
                "redirect": null,
                "order": {
                    "databaseId": 101,
                    "orderNumber": "101",
                    "status": "PROCESSING",
                    "total": "24.00",
                    "billing": { "email": "jo@example.com" },
                    "lineItems": { "nodes": [
                        { "quantity": 2, "total": "24.00", "product": { "node": { "name": "Tee", "slug": "tee" } } }
                    ]}
                }
            }
        });
        let data: checkout::ResponseData = serde_json::from_value(json).unwrap();
        let order = data.checkout.unwrap().order.unwrap();
        assert_eq!(order.database_id, 101);
        assert!(order.customer.is_none());
        assert_eq!(order.line_items.unwrap().nodes.len(), 1);
    }
}
