//! Cart session plumbing.
//!
//! The browser session stores only the WooCommerce session token. Every
//! cart call sends it, and every response may carry a refreshed one, which
//! is written back before the handler returns.

use thiserror::Error;
use tower_sessions::Session;
use tracing::{error, warn};
use woo_headless_core::Quantity;

use crate::catalog::{SelectedAttributes, VariationMatchError, match_variation, resolved_attributes};
use crate::models::{CustomerSession, session_keys};
use crate::woo::{CartLineInput, Envelope, Product, ProductKind, RequestContext};

/// Tokens identifying the shopper's cart.
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    session_token: Option<String>,
    auth_token: Option<String>,
}

impl CartSession {
    /// Read the cart token (and customer JWT, when usable) from the session.
    pub async fn load(session: &Session) -> Self {
        let session_token = session
            .get::<String>(session_keys::WOO_SESSION)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read cart session token");
                None
            });

        let now = chrono::Utc::now().timestamp();
        let auth_token = session
            .get::<CustomerSession>(session_keys::CUSTOMER)
            .await
            .ok()
            .flatten()
            .filter(|customer| !customer.needs_refresh(now))
            .map(|customer| customer.auth_token);

        Self {
            session_token,
            auth_token,
        }
    }

    /// Whether the shopper has ever had a cart.
    #[must_use]
    pub const fn has_cart(&self) -> bool {
        self.session_token.is_some()
    }

    /// Credentials for a cart call.
    #[must_use]
    pub fn context(&self) -> RequestContext<'_> {
        RequestContext::new(self.session_token.as_deref(), self.auth_token.as_deref())
    }

    /// Store a refreshed session token and unwrap the response.
    pub async fn persist<T>(&mut self, session: &Session, envelope: Envelope<T>) -> T {
        if let Some(token) = envelope.session_token
            && self.session_token.as_deref() != Some(token.as_str())
        {
            if let Err(e) = session.insert(session_keys::WOO_SESSION, &token).await {
                error!(error = %e, "Failed to save cart session token");
            }
            self.session_token = Some(token);
        }
        envelope.data
    }
}

/// Why a product cannot be added as requested.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddToCartError {
    /// Options missing or not a real combination.
    #[error(transparent)]
    Variation(#[from] VariationMatchError),

    /// The product or chosen variation is out of stock.
    #[error("{0} is out of stock.")]
    OutOfStock(String),

    /// Grouped and external products are not sold through the cart.
    #[error("{0} can't be added to the cart.")]
    NotPurchasable(String),
}

/// Turn a product and the shopper's choices into a cart line.
///
/// # Errors
///
/// Returns [`AddToCartError`] when the selection is incomplete, does not
/// exist, or is out of stock.
pub fn resolve_line(
    product: &Product,
    selected: &SelectedAttributes,
    quantity: Quantity,
) -> Result<CartLineInput, AddToCartError> {
    let summary = &product.summary;
    match summary.kind {
        ProductKind::Simple => {
            if !summary.stock_status.is_purchasable() {
                return Err(AddToCartError::OutOfStock(summary.name.clone()));
            }
            Ok(CartLineInput {
                product_id: summary.id,
                variation_id: None,
                attributes: Vec::new(),
                quantity,
            })
        }
        ProductKind::Variable => {
            let variation = match_variation(&product.variations, selected)?;
            if !variation.stock_status.is_purchasable() {
                return Err(AddToCartError::OutOfStock(variation.name.clone()));
            }
            Ok(CartLineInput {
                product_id: summary.id,
                variation_id: Some(variation.id),
                attributes: resolved_attributes(variation, selected),
                quantity,
            })
        }
        ProductKind::Grouped | ProductKind::External | ProductKind::Other => {
            Err(AddToCartError::NotPurchasable(summary.name.clone()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;
    use woo_headless_core::{ProductId, StockStatus, VariationId};

    use super::*;
    use crate::woo::{ProductSummary, Variation, VariationAttribute};

    fn summary(kind: ProductKind, stock_status: StockStatus) -> ProductSummary {
        ProductSummary {
            id: ProductId::new(10),
            slug: "tee".to_string(),
            name: "Tee".to_string(),
            kind,
            price: None,
            regular_price: None,
            on_sale: false,
            stock_status,
            image: None,
            short_description: String::new(),
            average_rating: 0.0,
            review_count: 0,
        }
    }

    fn product(kind: ProductKind, variations: Vec<Variation>) -> Product {
        Product {
            summary: summary(kind, StockStatus::InStock),
            description: String::new(),
            sku: None,
            gallery: Vec::new(),
            categories: Vec::new(),
            stock_quantity: None,
            attributes: Vec::new(),
            variations,
            related: Vec::new(),
        }
    }

    fn variation(id: i32, size: &str, stock_status: StockStatus) -> Variation {
        Variation {
            id: VariationId::new(id),
            name: format!("Tee - {size}"),
            sku: None,
            price: None,
            regular_price: None,
            sale_price: None,
            stock_status,
            stock_quantity: None,
            image: None,
            attributes: vec![
                VariationAttribute {
                    name: "pa_size".to_string(),
                    value: size.to_string(),
                },
                VariationAttribute {
                    name: "color".to_string(),
                    value: String::new(),
                },
            ],
        }
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_simple_product_line() {
        let line = resolve_line(
            &product(ProductKind::Simple, Vec::new()),
            &SelectedAttributes::default(),
            qty(2),
        )
        .unwrap();
        assert_eq!(line.product_id, ProductId::new(10));
        assert!(line.variation_id.is_none());
        assert_eq!(line.quantity.get(), 2);
    }

    #[test]
    fn test_variable_product_resolves_any_attribute() {
        let product = product(
            ProductKind::Variable,
            vec![
                variation(11, "small", StockStatus::InStock),
                variation(12, "large", StockStatus::InStock),
            ],
        );
        let selected =
            SelectedAttributes::from_pairs([("attribute_pa_size", "Large"), ("attribute_color", "Red")]);
        let line = resolve_line(&product, &selected, qty(1)).unwrap();

        assert_eq!(line.variation_id, Some(VariationId::new(12)));
        assert_eq!(
            line.attributes,
            vec![
                VariationAttribute {
                    name: "pa_size".to_string(),
                    value: "large".to_string(),
                },
                VariationAttribute {
                    name: "color".to_string(),
                    value: "Red".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_variable_product_incomplete() {
        let product = product(
            ProductKind::Variable,
            vec![variation(11, "small", StockStatus::InStock)],
        );
        let selected = SelectedAttributes::from_pairs([("attribute_pa_size", "small")]);
        let err = resolve_line(&product, &selected, qty(1)).unwrap_err();
        assert_eq!(
            err,
            AddToCartError::Variation(VariationMatchError::IncompleteSelection(vec![
                "Color".to_string()
            ]))
        );
    }

    #[test]
    fn test_out_of_stock_variation() {
        let product = product(
            ProductKind::Variable,
            vec![variation(11, "small", StockStatus::OutOfStock)],
        );
        let selected =
            SelectedAttributes::from_pairs([("pa_size", "small"), ("color", "blue")]);
        assert!(matches!(
            resolve_line(&product, &selected, qty(1)),
            Err(AddToCartError::OutOfStock(_))
        ));
    }

    #[test]
    fn test_grouped_not_purchasable() {
        assert!(matches!(
            resolve_line(
                &product(ProductKind::Grouped, Vec::new()),
                &SelectedAttributes::default(),
                qty(1)
            ),
            Err(AddToCartError::NotPurchasable(_))
        ));
    }

    #[tokio::test]
    async fn test_persist_stores_new_token() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut cart = CartSession::load(&session).await;
        assert!(!cart.has_cart());

        let value = cart
            .persist(
                &session,
                Envelope {
                    data: 5,
                    session_token: Some("fresh".to_string()),
                },
            )
            .await;

        assert_eq!(value, 5);
        assert!(cart.has_cart());
        assert_eq!(cart.context().session_token, Some("fresh"));
        let stored: Option<String> = session.get(session_keys::WOO_SESSION).await.unwrap();
        assert_eq!(stored.as_deref(), Some("fresh"));
    }
}
