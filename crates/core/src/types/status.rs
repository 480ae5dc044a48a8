//! Status enums reported by WooCommerce.
//!
//! Values use the GraphQL enum spelling (`SCREAMING_SNAKE_CASE`) so they
//! deserialize straight from WooGraphQL responses.

use serde::{Deserialize, Serialize};

/// Stock status of a product or variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
}

impl StockStatus {
    /// Whether the item can be added to a cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        !matches!(self, Self::OutOfStock)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::OutOfStock => "Out of stock",
            Self::OnBackorder => "Available on backorder",
        }
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    CheckoutDraft,
}

impl OrderStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending payment",
            Self::Processing => "Processing",
            Self::OnHold => "On hold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
            Self::Failed => "Failed",
            Self::CheckoutDraft => "Draft",
        }
    }

    /// Whether the order is finished (no further fulfilment expected).
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Refunded | Self::Failed
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_from_graphql() {
        let status: StockStatus = serde_json::from_str("\"ON_BACKORDER\"").unwrap();
        assert_eq!(status, StockStatus::OnBackorder);
        assert!(status.is_purchasable());
        assert!(!StockStatus::OutOfStock.is_purchasable());
    }

    #[test]
    fn test_order_status_from_graphql() {
        let status: OrderStatus = serde_json::from_str("\"ON_HOLD\"").unwrap();
        assert_eq!(status, OrderStatus::OnHold);
        assert_eq!(status.label(), "On hold");
        assert!(!status.is_final());
        assert!(OrderStatus::Refunded.is_final());
    }
}
