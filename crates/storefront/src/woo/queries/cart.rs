//! Cart operations (`graphql/cart.graphql`).

use serde::{Deserialize, Serialize};

use super::{ImageFields, Node, graphql_operation};

const DOCUMENT: &str = include_str!("../../../graphql/cart.graphql");

graphql_operation!(GetCart, get_cart, DOCUMENT);
graphql_operation!(AddToCart, add_to_cart, DOCUMENT);
graphql_operation!(UpdateItemQuantities, update_item_quantities, DOCUMENT);
graphql_operation!(RemoveItemsFromCart, remove_items_from_cart, DOCUMENT);
graphql_operation!(ApplyCoupon, apply_coupon, DOCUMENT);
graphql_operation!(RemoveCoupons, remove_coupons, DOCUMENT);
graphql_operation!(UpdateShippingMethod, update_shipping_method, DOCUMENT);

/// `CartFields` fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartFields {
    #[serde(default)]
    pub is_empty: bool,
    pub subtotal: Option<String>,
    pub discount_total: Option<String>,
    pub shipping_total: Option<String>,
    pub total_tax: Option<String>,
    pub total: Option<String>,
    #[serde(default)]
    pub needs_shipping_address: bool,
    pub chosen_shipping_methods: Option<Vec<Option<String>>>,
    pub applied_coupons: Option<Vec<AppliedCoupon>>,
    pub available_shipping_methods: Option<Vec<ShippingPackage>>,
    pub contents: Option<Contents>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_amount: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingPackage {
    pub rates: Option<Vec<ShippingRate>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingRate {
    pub id: String,
    pub label: Option<String>,
    pub cost: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contents {
    pub item_count: Option<i32>,
    #[serde(default)]
    pub nodes: Vec<CartItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub key: String,
    pub quantity: Option<i32>,
    pub subtotal: Option<String>,
    pub total: Option<String>,
    pub product: Option<Node<CartProduct>>,
    pub variation: Option<CartVariation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub database_id: i32,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartVariation {
    pub attributes: Option<Vec<CartVariationAttribute>>,
    pub node: Option<CartVariationNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartVariationAttribute {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartVariationNode {
    pub database_id: i32,
    pub name: Option<String>,
    pub image: Option<ImageFields>,
}

/// `{ cart { ...CartFields } }` payload shared by every cart mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct CartPayload {
    pub cart: Option<CartFields>,
}

pub mod get_cart {
    use super::{CartFields, Deserialize};

    pub type Variables = super::super::NoVariables;

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<CartFields>,
    }
}

pub mod add_to_cart {
    use super::{CartPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: AddToCartInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AddToCartInput {
        pub product_id: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub variation_id: Option<i32>,
        pub quantity: u32,
        /// Concrete values for the variation's "any" attributes.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub variation: Vec<ProductAttributeInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductAttributeInput {
        pub attribute_name: String,
        pub attribute_value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub add_to_cart: Option<CartPayload>,
    }
}

pub mod update_item_quantities {
    use super::{CartPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: UpdateItemQuantitiesInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct UpdateItemQuantitiesInput {
        pub items: Vec<CartItemQuantityInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct CartItemQuantityInput {
        pub key: String,
        pub quantity: u32,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub update_item_quantities: Option<CartPayload>,
    }
}

pub mod remove_items_from_cart {
    use super::{CartPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: RemoveItemsFromCartInput,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    pub struct RemoveItemsFromCartInput {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub keys: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub all: Option<bool>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub remove_items_from_cart: Option<CartPayload>,
    }
}

pub mod apply_coupon {
    use super::{CartPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: ApplyCouponInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct ApplyCouponInput {
        pub code: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub apply_coupon: Option<CartPayload>,
    }
}

pub mod remove_coupons {
    use super::{CartPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: RemoveCouponsInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct RemoveCouponsInput {
        pub codes: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub remove_coupons: Option<CartPayload>,
    }
}

pub mod update_shipping_method {
    use super::{CartPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: UpdateShippingMethodInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UpdateShippingMethodInput {
        pub shipping_methods: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub update_shipping_method: Option<CartPayload>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_all_serializes_without_keys() {
        let vars = remove_items_from_cart::Variables {
            input: remove_items_from_cart::RemoveItemsFromCartInput {
                keys: vec![],
                all: Some(true),
            },
        };
        assert_eq!(
            serde_json::to_value(vars).unwrap(),
            serde_json::json!({ "input": { "all": true } })
        );
    }

    #[test]
    fn test_add_to_cart_omits_missing_variation() {
        let vars = add_to_cart::Variables {
            input: add_to_cart::AddToCartInput {
                product_id: 12,
                variation_id: None,
                quantity: 2,
                variation: vec![],
            },
        };
        assert_eq!(
            serde_json::to_value(vars).unwrap(),
            serde_json::json!({ "input": { "productId": 12, "quantity": 2 } })
        );
    }
}
