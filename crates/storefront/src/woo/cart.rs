//! Cart operations. Never cached: the cart belongs to the session token.

use tracing::instrument;
use woo_headless_core::Quantity;

use super::conversions::convert_cart;
use super::queries::NoVariables;
use super::queries::cart::{
    AddToCart, ApplyCoupon, GetCart, RemoveCoupons, RemoveItemsFromCart, UpdateItemQuantities,
    UpdateShippingMethod, add_to_cart, apply_coupon, remove_coupons, remove_items_from_cart,
    update_item_quantities, update_shipping_method,
};
use super::types::{Cart, CartLineInput};
use super::{Envelope, RequestContext, WooClient, WooError};

impl WooClient {
    /// Get the cart for the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx))]
    pub async fn get_cart(&self, ctx: &RequestContext<'_>) -> Result<Envelope<Cart>, WooError> {
        let currency = self.currency();
        Ok(self
            .execute::<GetCart>(ctx, NoVariables {})
            .await?
            .map(|data| convert_cart(data.cart, currency)))
    }

    /// Add a line to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or WooCommerce rejects the
    /// line (out of stock, missing options).
    #[instrument(skip(self, ctx, line), fields(product_id = %line.product_id))]
    pub async fn add_to_cart(
        &self,
        ctx: &RequestContext<'_>,
        line: &CartLineInput,
    ) -> Result<Envelope<Cart>, WooError> {
        let variables = add_to_cart::Variables {
            input: add_to_cart::AddToCartInput {
                product_id: line.product_id.as_i32(),
                variation_id: line.variation_id.map(|id| id.as_i32()),
                quantity: line.quantity.get(),
                variation: line
                    .attributes
                    .iter()
                    .map(|a| add_to_cart::ProductAttributeInput {
                        attribute_name: a.name.clone(),
                        attribute_value: a.value.clone(),
                    })
                    .collect(),
            },
        };
        let currency = self.currency();
        Ok(self
            .execute::<AddToCart>(ctx, variables)
            .await?
            .map(|data| convert_cart(data.add_to_cart.and_then(|p| p.cart), currency)))
    }

    /// Set quantities of existing lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx, items))]
    pub async fn update_item_quantities(
        &self,
        ctx: &RequestContext<'_>,
        items: &[(String, Quantity)],
    ) -> Result<Envelope<Cart>, WooError> {
        let variables = update_item_quantities::Variables {
            input: update_item_quantities::UpdateItemQuantitiesInput {
                items: items
                    .iter()
                    .map(|(key, quantity)| update_item_quantities::CartItemQuantityInput {
                        key: key.clone(),
                        quantity: quantity.get(),
                    })
                    .collect(),
            },
        };
        let currency = self.currency();
        Ok(self
            .execute::<UpdateItemQuantities>(ctx, variables)
            .await?
            .map(|data| {
                convert_cart(data.update_item_quantities.and_then(|p| p.cart), currency)
            }))
    }

    /// Remove lines by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx, keys))]
    pub async fn remove_items(
        &self,
        ctx: &RequestContext<'_>,
        keys: &[String],
    ) -> Result<Envelope<Cart>, WooError> {
        self.remove_items_from_cart(
            ctx,
            remove_items_from_cart::RemoveItemsFromCartInput {
                keys: keys.to_vec(),
                all: None,
            },
        )
        .await
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx))]
    pub async fn empty_cart(&self, ctx: &RequestContext<'_>) -> Result<Envelope<Cart>, WooError> {
        self.remove_items_from_cart(
            ctx,
            remove_items_from_cart::RemoveItemsFromCartInput {
                keys: Vec::new(),
                all: Some(true),
            },
        )
        .await
    }

    async fn remove_items_from_cart(
        &self,
        ctx: &RequestContext<'_>,
        input: remove_items_from_cart::RemoveItemsFromCartInput,
    ) -> Result<Envelope<Cart>, WooError> {
        let variables = remove_items_from_cart::Variables { input };
        let currency = self.currency();
        Ok(self
            .execute::<RemoveItemsFromCart>(ctx, variables)
            .await?
            .map(|data| {
                convert_cart(data.remove_items_from_cart.and_then(|p| p.cart), currency)
            }))
    }

    /// Apply a coupon code.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the coupon is rejected;
    /// rejection messages are customer-facing (see [`WooError::user_message`]).
    #[instrument(skip(self, ctx))]
    pub async fn apply_coupon(
        &self,
        ctx: &RequestContext<'_>,
        code: &str,
    ) -> Result<Envelope<Cart>, WooError> {
        let variables = apply_coupon::Variables {
            input: apply_coupon::ApplyCouponInput {
                code: code.to_string(),
            },
        };
        let currency = self.currency();
        Ok(self
            .execute::<ApplyCoupon>(ctx, variables)
            .await?
            .map(|data| convert_cart(data.apply_coupon.and_then(|p| p.cart), currency)))
    }

    /// Remove a coupon code.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx))]
    pub async fn remove_coupon(
        &self,
        ctx: &RequestContext<'_>,
        code: &str,
    ) -> Result<Envelope<Cart>, WooError> {
        let variables = remove_coupons::Variables {
            input: remove_coupons::RemoveCouponsInput {
                codes: vec![code.to_string()],
            },
        };
        let currency = self.currency();
        Ok(self
            .execute::<RemoveCoupons>(ctx, variables)
            .await?
            .map(|data| convert_cart(data.remove_coupons.and_then(|p| p.cart), currency)))
    }

    /// Choose a shipping rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx))]
    pub async fn select_shipping_method(
        &self,
        ctx: &RequestContext<'_>,
        rate_id: &str,
    ) -> Result<Envelope<Cart>, WooError> {
        let variables = update_shipping_method::Variables {
            input: update_shipping_method::UpdateShippingMethodInput {
                shipping_methods: vec![rate_id.to_string()],
            },
        };
        let currency = self.currency();
        Ok(self
            .execute::<UpdateShippingMethod>(ctx, variables)
            .await?
            .map(|data| {
                convert_cart(data.update_shipping_method.and_then(|p| p.cart), currency)
            }))
    }
}
