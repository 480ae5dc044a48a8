//! Payment gateways and the checkout mutation.

use tracing::{debug, info, instrument, warn};

use super::cache::{CacheKey, CacheValue};
use super::conversions::{convert_address_input, convert_order};
use super::queries::NoVariables;
use super::queries::checkout::{Checkout, GetPaymentGateways, checkout};
use super::types::{CheckoutRequest, CheckoutResult, PaymentGateway};
use super::{Envelope, RequestContext, WooClient, WooError};

/// Build the `checkout` mutation input.
pub(super) fn checkout_input(request: &CheckoutRequest) -> checkout::CheckoutInput {
    checkout::CheckoutInput {
        payment_method: request.payment_method.clone(),
        billing: convert_address_input(&request.billing, true),
        shipping: request
            .shipping
            .as_ref()
            .map(|address| convert_address_input(address, false)),
        ship_to_different_address: request.shipping.is_some(),
        customer_note: request
            .customer_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_string),
        shipping_method: request.shipping_method.iter().cloned().collect(),
        is_paid: false,
    }
}

impl WooClient {
    /// Get the enabled payment gateways.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_payment_gateways(&self) -> Result<Vec<PaymentGateway>, WooError> {
        if let Some(CacheValue::PaymentGateways(gateways)) =
            self.inner.cache.get(&CacheKey::PaymentGateways).await
        {
            debug!("Cache hit for payment gateways");
            return Ok(gateways);
        }

        let data = self.query::<GetPaymentGateways>(NoVariables {}).await?;
        let gateways: Vec<PaymentGateway> = data
            .payment_gateways
            .map(|g| g.nodes)
            .unwrap_or_default()
            .into_iter()
            .map(|g| PaymentGateway {
                title: g.title.unwrap_or_else(|| g.id.clone()),
                description: g.description.unwrap_or_default(),
                id: g.id,
            })
            .collect();

        self.inner
            .cache
            .insert(
                CacheKey::PaymentGateways,
                CacheValue::PaymentGateways(gateways.clone()),
            )
            .await;

        Ok(gateways)
    }

    /// Place an order from the session's cart.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::UserError`] when WooCommerce reports a failed
    /// checkout, or an error if the API request fails.
    #[instrument(skip(self, ctx, request), fields(payment_method = %request.payment_method))]
    pub async fn checkout(
        &self,
        ctx: &RequestContext<'_>,
        request: &CheckoutRequest,
    ) -> Result<Envelope<CheckoutResult>, WooError> {
        let variables = checkout::Variables {
            input: checkout_input(request),
        };
        let currency = self.currency();

        self.execute::<Checkout>(ctx, variables)
            .await?
            .try_map(|data| {
                let payload = data.checkout.ok_or_else(|| {
                    WooError::UserError("We couldn't place your order. Please try again.".into())
                })?;

                if payload.result.as_deref() == Some("failure") {
                    warn!("Checkout reported failure");
                    return Err(WooError::UserError(
                        "Payment failed. Please check your details and try again.".into(),
                    ));
                }

                let order = payload.order.ok_or_else(|| {
                    WooError::UserError("We couldn't place your order. Please try again.".into())
                })?;
                let order = convert_order(order, currency);
                info!(order_number = %order.number, "Order placed");

                Ok(CheckoutResult {
                    order,
                    redirect: payload.redirect.filter(|url| !url.trim().is_empty()),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::woo::types::Address;

    fn address() -> Address {
        Address {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address_1: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            postcode: "N1".to_string(),
            country: "GB".to_string(),
            email: "ada@example.com".to_string(),
            ..Address::default()
        }
    }

    #[test]
    fn test_checkout_input_same_address() {
        let request = CheckoutRequest {
            payment_method: "cod".to_string(),
            billing: address(),
            shipping: None,
            customer_note: Some("   ".to_string()),
            shipping_method: Some("flat_rate:1".to_string()),
        };
        let input = checkout_input(&request);

        assert!(!input.ship_to_different_address);
        assert!(input.shipping.is_none());
        assert_eq!(input.billing.email.as_deref(), Some("ada@example.com"));
        assert_eq!(input.customer_note, None);
        assert_eq!(input.shipping_method, vec!["flat_rate:1".to_string()]);
    }

    #[test]
    fn test_checkout_input_different_shipping() {
        let request = CheckoutRequest {
            payment_method: "cod".to_string(),
            billing: address(),
            shipping: Some(Address {
                city: "Paris".to_string(),
                ..address()
            }),
            customer_note: Some("Leave at door".to_string()),
            shipping_method: None,
        };
        let input = checkout_input(&request);

        assert!(input.ship_to_different_address);
        let shipping = input.shipping.as_ref().map(|s| s.city.as_str());
        assert_eq!(shipping, Some("Paris"));
        assert_eq!(input.customer_note.as_deref(), Some("Leave at door"));
        assert!(input.shipping_method.is_empty());
    }
}
