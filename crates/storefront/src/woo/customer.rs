//! Customer auth, profile and order history.

use tracing::{info, instrument, warn};
use woo_headless_core::OrderId;

use crate::catalog::PageRequest;

use super::conversions::{
    convert_address_input, convert_auth_payload, convert_customer, convert_order,
    convert_order_connection,
};
use super::queries::NoVariables;
use super::queries::OffsetPaginationInput;
use super::queries::customer::{
    GetCustomer, GetCustomerOrders, GetOrder, Login, RefreshAuthToken, RegisterCustomer,
    ResetUserPassword, SendPasswordResetEmail, UpdateCustomer, get_customer_orders, get_order,
    login, refresh_auth_token, register_customer, reset_user_password, send_password_reset_email,
    update_customer,
};
use super::types::{
    Customer, CustomerUpdate, LoginResult, NewCustomer, Order, OrderConnection,
};
use super::{Envelope, RequestContext, WooClient, WooError};

/// Build the `updateCustomer` mutation input.
pub(super) fn update_customer_input(update: &CustomerUpdate) -> update_customer::UpdateCustomerInput {
    update_customer::UpdateCustomerInput {
        first_name: update.first_name.clone(),
        last_name: update.last_name.clone(),
        display_name: update.display_name.clone(),
        email: update.email.clone(),
        password: update.password.clone(),
        billing: update
            .billing
            .as_ref()
            .map(|address| convert_address_input(address, true)),
        shipping: update
            .shipping
            .as_ref()
            .map(|address| convert_address_input(address, false)),
    }
}

impl WooClient {
    /// Log a customer in with username (or email) and password.
    ///
    /// The guest session token in `ctx` is sent along so WooCommerce can
    /// merge the guest cart into the customer's.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::UserError`] for bad credentials, or an error if
    /// the API request fails.
    #[instrument(skip(self, ctx, password))]
    pub async fn login(
        &self,
        ctx: &RequestContext<'_>,
        username: &str,
        password: &str,
    ) -> Result<Envelope<LoginResult>, WooError> {
        let variables = login::Variables {
            input: login::LoginInput {
                username: username.to_string(),
                password: password.to_string(),
            },
        };
        let result = self
            .execute::<Login>(ctx, variables)
            .await
            .map_err(credentials_error)?
            .try_map(|data| convert_auth_payload(data.login))?;

        info!(customer_id = %result.data.customer.id, "Customer logged in");
        Ok(result)
    }

    /// Register a new customer. The email doubles as the username.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::UserError`] when the email is already registered
    /// or the password is rejected, or an error if the API request fails.
    #[instrument(skip(self, ctx, customer))]
    pub async fn register_customer(
        &self,
        ctx: &RequestContext<'_>,
        customer: &NewCustomer,
    ) -> Result<Envelope<LoginResult>, WooError> {
        let variables = register_customer::Variables {
            input: register_customer::RegisterCustomerInput {
                email: customer.email.clone(),
                username: customer.email.clone(),
                password: customer.password.clone(),
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
            },
        };
        let result = self
            .execute::<RegisterCustomer>(ctx, variables)
            .await
            .map_err(registration_error)?
            .try_map(|data| convert_auth_payload(data.register_customer))?;

        info!(customer_id = %result.data.customer.id, "Customer registered");
        Ok(result)
    }

    /// Exchange a refresh token for a new auth token.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::Unauthorized`] if the refresh token is no longer
    /// valid, or an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn refresh_auth_token(&self, refresh_token: &str) -> Result<String, WooError> {
        let variables = refresh_auth_token::Variables {
            input: refresh_auth_token::RefreshJwtAuthTokenInput {
                jwt_refresh_token: refresh_token.to_string(),
            },
        };
        let data = self.query::<RefreshAuthToken>(variables).await.map_err(|e| match e {
            WooError::GraphQL(errors) => {
                warn!(errors = %super::format_graphql_errors(&errors), "Token refresh rejected");
                WooError::Unauthorized("Refresh token rejected".to_string())
            }
            other => other,
        })?;

        data.refresh_jwt_auth_token
            .and_then(|p| p.auth_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| WooError::Unauthorized("No auth token in refresh response".to_string()))
    }

    /// Get the logged-in customer.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::Unauthorized`] if the auth token does not
    /// identify a customer, or an error if the API request fails.
    #[instrument(skip(self, ctx))]
    pub async fn get_customer(
        &self,
        ctx: &RequestContext<'_>,
    ) -> Result<Envelope<Customer>, WooError> {
        self.execute::<GetCustomer>(ctx, NoVariables {})
            .await?
            .try_map(|data| {
                data.customer
                    .and_then(convert_customer)
                    .ok_or_else(|| WooError::Unauthorized("Not logged in".to_string()))
            })
    }

    /// Get a page of the customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx, page), fields(page = page.page()))]
    pub async fn get_customer_orders(
        &self,
        ctx: &RequestContext<'_>,
        page: PageRequest,
    ) -> Result<Envelope<OrderConnection>, WooError> {
        let variables = get_customer_orders::Variables {
            where_: get_customer_orders::OrderWhereArgs {
                offset_pagination: OffsetPaginationInput {
                    offset: page.offset(),
                    size: page.per_page(),
                },
                orderby: vec![get_customer_orders::OrdersOrderby {
                    field: "DATE",
                    order: "DESC",
                }],
            },
        };
        let currency = self.currency();
        Ok(self
            .execute::<GetCustomerOrders>(ctx, variables)
            .await?
            .map(|data| {
                convert_order_connection(data.customer.and_then(|c| c.orders), currency)
            }))
    }

    /// Get one order by database id.
    ///
    /// WooGraphQL only resolves orders the viewer may see; callers still
    /// check [`Order::customer_id`] against the session.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::NotFound`] if the order is missing or hidden, or
    /// an error if the API request fails.
    #[instrument(skip(self, ctx), fields(order_id = %id))]
    pub async fn get_order(
        &self,
        ctx: &RequestContext<'_>,
        id: OrderId,
    ) -> Result<Envelope<Order>, WooError> {
        let variables = get_order::Variables { id: id.to_string() };
        let currency = self.currency();
        self.execute::<GetOrder>(ctx, variables)
            .await?
            .try_map(|data| {
                data.order
                    .map(|order| convert_order(order, currency))
                    .ok_or_else(|| WooError::NotFound(format!("Order not found: {id}")))
            })
    }

    /// Update the customer's profile or addresses.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::UserError`] when WooCommerce rejects the change
    /// (email taken), or an error if the API request fails.
    #[instrument(skip(self, ctx, update))]
    pub async fn update_customer(
        &self,
        ctx: &RequestContext<'_>,
        update: &CustomerUpdate,
    ) -> Result<Envelope<Customer>, WooError> {
        let variables = update_customer::Variables {
            input: update_customer_input(update),
        };
        self.execute::<UpdateCustomer>(ctx, variables)
            .await
            .map_err(registration_error)?
            .try_map(|data| {
                data.update_customer
                    .and_then(|p| p.customer)
                    .and_then(convert_customer)
                    .ok_or_else(|| WooError::Unauthorized("Not logged in".to_string()))
            })
    }

    /// Ask WordPress to email a password reset link.
    ///
    /// Unknown accounts are not reported, so the caller can show the same
    /// confirmation either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails for reasons other than an
    /// unknown account.
    #[instrument(skip_all)]
    pub async fn send_password_reset_email(&self, username: &str) -> Result<(), WooError> {
        let variables = send_password_reset_email::Variables {
            input: send_password_reset_email::SendPasswordResetEmailInput {
                username: username.to_string(),
            },
        };
        match self.query::<SendPasswordResetEmail>(variables).await {
            Ok(data) => {
                if !data.send_password_reset_email.is_some_and(|p| p.success) {
                    warn!("Password reset email not sent");
                }
                Ok(())
            }
            Err(WooError::GraphQL(errors)) => {
                warn!(errors = %super::format_graphql_errors(&errors), "Password reset request rejected");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Set a new password using the key from the reset email.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::UserError`] if the key is invalid or expired, or
    /// an error if the API request fails.
    #[instrument(skip(self, key, password))]
    pub async fn reset_password(
        &self,
        key: &str,
        login: &str,
        password: &str,
    ) -> Result<(), WooError> {
        let variables = reset_user_password::Variables {
            input: reset_user_password::ResetUserPasswordInput {
                key: key.to_string(),
                login: login.to_string(),
                password: password.to_string(),
            },
        };
        let data = self
            .query::<ResetUserPassword>(variables)
            .await
            .map_err(|e| match e {
                WooError::GraphQL(_) | WooError::Unauthorized(_) => WooError::UserError(
                    "This password reset link is invalid or has expired.".to_string(),
                ),
                other => other,
            })?;

        if data
            .reset_user_password
            .and_then(|p| p.user)
            .and_then(|u| u.database_id)
            .is_some()
        {
            info!("Password reset");
            Ok(())
        } else {
            Err(WooError::UserError(
                "This password reset link is invalid or has expired.".to_string(),
            ))
        }
    }
}

/// Login failures come back as GraphQL errors with HTML-laden messages;
/// show one generic line instead.
fn credentials_error(error: WooError) -> WooError {
    match error {
        WooError::GraphQL(errors) => {
            warn!(errors = %super::format_graphql_errors(&errors), "Login rejected");
            WooError::UserError("Incorrect email or password.".to_string())
        }
        WooError::Unauthorized(_) => {
            WooError::UserError("Incorrect email or password.".to_string())
        }
        other => other,
    }
}

/// Registration and profile errors carry useful text ("email already
/// registered"); pass the first message through.
fn registration_error(error: WooError) -> WooError {
    match error {
        WooError::GraphQL(errors) => {
            let message = errors
                .first()
                .map(|e| super::strip_tags(&e.message))
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "We couldn't save your details. Please try again.".to_string());
            WooError::UserError(message)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::woo::GraphQLError;
    use crate::woo::types::Address;

    #[test]
    fn test_credentials_error_is_generic() {
        let err = credentials_error(WooError::GraphQL(vec![GraphQLError::message(
            "<strong>Error</strong>: The password you entered for ada is incorrect.",
        )]));
        assert!(matches!(err, WooError::UserError(ref m) if m == "Incorrect email or password."));
    }

    #[test]
    fn test_credentials_error_passes_transport_errors() {
        let err = credentials_error(WooError::RateLimited(30));
        assert!(matches!(err, WooError::RateLimited(30)));
    }

    #[test]
    fn test_registration_error_strips_tags() {
        let err = registration_error(WooError::GraphQL(vec![GraphQLError::message(
            "An account is already registered with <b>your email address</b>.",
        )]));
        assert!(matches!(
            err,
            WooError::UserError(ref m) if m == "An account is already registered with your email address."
        ));
    }

    #[test]
    fn test_update_input_only_sets_changed_fields() {
        let update = CustomerUpdate {
            shipping: Some(Address {
                city: "Leeds".to_string(),
                email: "ignored@example.com".to_string(),
                ..Address::default()
            }),
            ..CustomerUpdate::default()
        };
        let input = update_customer_input(&update);

        assert!(input.first_name.is_none());
        assert!(input.billing.is_none());
        let shipping = input.shipping.as_ref();
        assert_eq!(shipping.map(|s| s.city.as_str()), Some("Leeds"));
        assert_eq!(shipping.and_then(|s| s.email.clone()), None);
    }
}
