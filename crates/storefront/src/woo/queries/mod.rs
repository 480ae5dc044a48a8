//! GraphQL operation definitions.
//!
//! Each operation is a unit struct implementing [`graphql_client::GraphQLQuery`]
//! with a sibling `snake_case` module holding its `Variables` and
//! `ResponseData`, the same shape `#[derive(GraphQLQuery)]` generates. The
//! types are written by hand so the crate builds without a checked-in schema
//! dump; the documents themselves live in `graphql/*.graphql`.
//!
//! WooGraphQL answers interface-typed fields (`Product`, `ProductVariation`)
//! with one merged JSON object, so fields from inline fragments are plain
//! `Option`s here rather than per-type enums.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customer;
pub mod site;

use serde::{Deserialize, Serialize};

/// Implement `GraphQLQuery` for an operation in a multi-operation document.
macro_rules! graphql_operation {
    ($name:ident, $module:ident, $document:expr) => {
        pub struct $name;

        impl ::graphql_client::GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(
                variables: Self::Variables,
            ) -> ::graphql_client::QueryBody<Self::Variables> {
                ::graphql_client::QueryBody {
                    variables,
                    query: $document,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

pub(crate) use graphql_operation;

/// Variables for operations that take none.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

/// `ImageFields` fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub source_url: Option<String>,
    pub alt_text: Option<String>,
}

/// `{ nodes { .. } }` connection wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "T: Deserialize<'de>")]
pub struct Nodes<T> {
    #[serde(default)]
    pub nodes: Vec<T>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

/// `{ node { .. } }` edge wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Node<T> {
    pub node: Option<T>,
}

/// `pageInfo { offsetPagination { .. } }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPageInfoFields {
    pub offset_pagination: Option<OffsetPaginationFields>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPaginationFields {
    pub total: Option<i64>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub has_previous: bool,
}

/// `offsetPagination` input of a connection's `where` args.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffsetPaginationInput {
    pub offset: u32,
    pub size: u32,
}

/// `AddressFields` fragment (`CustomerAddress`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    #[serde(rename = "address1")]
    pub address_1: Option<String>,
    #[serde(rename = "address2")]
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// `CustomerAddressInput`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    #[serde(rename = "address1")]
    pub address_1: String,
    #[serde(rename = "address2")]
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    /// Write the address back to the customer profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
}

/// Order line items shared by `GetOrder` and `Checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemFields {
    pub quantity: Option<i32>,
    pub total: Option<String>,
    pub product: Option<Node<LineItemProduct>>,
    pub variation: Option<Node<LineItemVariation>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItemProduct {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItemVariation {
    pub name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use graphql_client::GraphQLQuery;

    use super::*;

    #[test]
    fn test_operation_names_exist_in_documents() {
        let body = catalog::GetProducts::build_query(catalog::get_products::Variables::default());
        assert_eq!(body.operation_name, "GetProducts");
        assert!(body.query.contains("query GetProducts("));

        let body = cart::AddToCart::build_query(cart::add_to_cart::Variables {
            input: cart::add_to_cart::AddToCartInput {
                product_id: 1,
                variation_id: None,
                quantity: 1,
                variation: vec![],
            },
        });
        assert!(body.query.contains("mutation AddToCart("));
        assert!(body.query.contains("fragment CartFields"));

        let body = customer::Login::build_query(customer::login::Variables {
            input: customer::login::LoginInput {
                username: "a".to_string(),
                password: "b".to_string(),
            },
        });
        assert!(body.query.contains("mutation Login("));

        let body = checkout::Checkout::build_query(checkout::checkout::Variables {
            input: checkout::checkout::CheckoutInput::default(),
        });
        assert!(body.query.contains("mutation Checkout("));

        let body = site::GetMenu::build_query(site::get_menu::Variables {
            location: "PRIMARY".to_string(),
        });
        assert!(body.query.contains("query GetMenu("));
    }

    #[test]
    fn test_request_body_shape() {
        let body = catalog::GetProductBySlug::build_query(catalog::get_product_by_slug::Variables {
            slug: "hoodie".to_string(),
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["operationName"], "GetProductBySlug");
        assert_eq!(json["variables"]["slug"], "hoodie");
        assert!(json["query"].as_str().unwrap().contains("idType: SLUG"));
    }

    #[test]
    fn test_nodes_default_when_missing() {
        let nodes: Nodes<ImageFields> = serde_json::from_str("{}").unwrap();
        assert!(nodes.nodes.is_empty());
    }
}
