//! Domain types for the WooCommerce GraphQL API.
//!
//! These types provide a clean, ergonomic API separate from the raw response
//! structs in `queries`. Money is parsed into [`Price`] once, at the boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use woo_headless_core::{
    CategoryId, CustomerId, OrderId, OrderStatus, Price, PriceRange, ProductId, Quantity,
    StockStatus, VariationId,
};

// =============================================================================
// Media
// =============================================================================

/// Product, variation or category image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Absolute image URL.
    pub url: String,
    /// Alt text for accessibility (may be empty).
    pub alt: String,
}

// =============================================================================
// Product Types
// =============================================================================

/// WooCommerce product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductKind {
    #[default]
    Simple,
    Variable,
    Grouped,
    External,
    Other,
}

impl ProductKind {
    /// Parse the GraphQL `ProductTypesEnum` value.
    #[must_use]
    pub fn from_graphql(value: &str) -> Self {
        match value {
            "SIMPLE" => Self::Simple,
            "VARIABLE" => Self::Variable,
            "GROUPED" => Self::Grouped,
            "EXTERNAL" => Self::External,
            _ => Self::Other,
        }
    }
}

/// The fields needed to render a product card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub kind: ProductKind,
    /// Current price (a range for variable products).
    pub price: Option<PriceRange>,
    /// Price before sale, when on sale.
    pub regular_price: Option<PriceRange>,
    pub on_sale: bool,
    pub stock_status: StockStatus,
    pub image: Option<Image>,
    /// Short description (HTML).
    pub short_description: String,
    pub average_rating: f64,
    pub review_count: i32,
}

impl ProductSummary {
    /// Whether the card can add straight to the cart without choosing options.
    #[must_use]
    pub fn is_simple_purchase(&self) -> bool {
        self.kind == ProductKind::Simple && self.stock_status.is_purchasable()
    }
}

/// A named product attribute (e.g. "Color" with options red/blue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    /// Attribute name as WooCommerce stores it (`pa_color` or `Color`).
    pub name: String,
    /// Human label.
    pub label: String,
    pub options: Vec<String>,
    /// Whether variations are keyed on this attribute.
    pub used_for_variations: bool,
}

/// A variation's value for one attribute. An empty value means "any".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAttribute {
    pub name: String,
    pub value: String,
}

/// A purchasable variation of a variable product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    pub id: VariationId,
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Price>,
    pub regular_price: Option<Price>,
    pub sale_price: Option<Price>,
    pub stock_status: StockStatus,
    pub stock_quantity: Option<i32>,
    pub image: Option<Image>,
    pub attributes: Vec<VariationAttribute>,
}

/// Reference to a category from a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A product with everything the detail page shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub summary: ProductSummary,
    /// Long description (HTML).
    pub description: String,
    pub sku: Option<String>,
    /// Gallery images (excluding the main image).
    pub gallery: Vec<Image>,
    pub categories: Vec<CategoryRef>,
    pub stock_quantity: Option<i32>,
    pub attributes: Vec<ProductAttribute>,
    pub variations: Vec<Variation>,
    pub related: Vec<ProductSummary>,
}

impl Product {
    /// Attributes the shopper must choose before adding to the cart.
    pub fn variation_attributes(&self) -> impl Iterator<Item = &ProductAttribute> {
        self.attributes.iter().filter(|a| a.used_for_variations)
    }
}

/// Pagination info from the WPGraphQL offset pagination extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetPageInfo {
    /// Total matching items across all pages.
    pub total: u32,
    pub has_more: bool,
    pub has_previous: bool,
}

/// One page of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConnection {
    pub products: Vec<ProductSummary>,
    pub page_info: OffsetPageInfo,
}

// =============================================================================
// Category Types
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    /// Description (HTML, may be empty).
    pub description: String,
    /// Number of published products.
    pub count: u32,
    pub parent_id: Option<CategoryId>,
    pub image: Option<Image>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart item key, used for updates and removal.
    pub key: String,
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub variation_id: Option<VariationId>,
    /// Chosen options ("Color: Red, Size: M").
    pub variation_label: Option<String>,
    pub quantity: Quantity,
    /// Line subtotal before discounts.
    pub subtotal: Price,
    /// Line total after discounts.
    pub total: Price,
    pub image: Option<Image>,
}

impl CartItem {
    /// Price of a single unit, derived from the line subtotal.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        let quantity = Decimal::from(self.quantity.get());
        Price::new(
            (self.subtotal.amount / quantity).round_dp(2),
            self.subtotal.currency_code,
        )
    }
}

/// A line to add to the cart.
#[derive(Debug, Clone)]
pub struct CartLineInput {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    /// Attribute values for the variation, including resolved "any" values.
    pub attributes: Vec<VariationAttribute>,
    pub quantity: Quantity,
}

/// Cart money totals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Price,
    pub discount: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

/// A coupon applied to the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub amount: Price,
}

/// An available shipping rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRate {
    /// Rate id (`flat_rate:1`).
    pub id: String,
    pub label: String,
    pub cost: Price,
    /// Whether this rate is the chosen one.
    pub selected: bool,
}

/// The remote cart, as last returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    /// Total number of units across lines.
    pub item_count: u32,
    pub totals: CartTotals,
    pub coupons: Vec<AppliedCoupon>,
    pub shipping_rates: Vec<ShippingRate>,
    pub needs_shipping_address: bool,
}

impl Cart {
    /// An empty cart in the store currency.
    #[must_use]
    pub fn empty(currency: woo_headless_core::CurrencyCode) -> Self {
        let zero = Price::zero(currency);
        Self {
            items: Vec::new(),
            item_count: 0,
            totals: CartTotals {
                subtotal: zero,
                discount: zero,
                shipping: zero,
                tax: zero,
                total: zero,
            },
            coupons: Vec::new(),
            shipping_rates: Vec::new(),
            needs_shipping_address: false,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by key.
    #[must_use]
    pub fn item(&self, key: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.key == key)
    }

    /// Id of the selected shipping rate.
    #[must_use]
    pub fn selected_shipping_rate(&self) -> Option<&str> {
        self.shipping_rates
            .iter()
            .find(|rate| rate.selected)
            .map(|rate| rate.id.as_str())
    }
}

// =============================================================================
// Customer Types
// =============================================================================

/// A billing or shipping address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub email: String,
    pub phone: String,
}

impl Address {
    /// Whether no address line has been filled in.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.address_1.trim().is_empty() && self.city.trim().is_empty()
    }

    /// Full name of the addressee.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Non-empty lines for display, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let locality = [self.city.trim(), self.state.trim(), self.postcode.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        [
            self.full_name(),
            self.company.trim().to_string(),
            self.address_1.trim().to_string(),
            self.address_2.trim().to_string(),
            locality,
            self.country.trim().to_string(),
        ]
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect()
    }
}

/// A registered customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub billing: Address,
    pub shipping: Address,
}

/// JWTs issued on login.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub auth_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("auth_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Result of `login` or `registerCustomer`.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub tokens: AuthTokens,
    pub customer: Customer,
    /// Session token of the customer's persistent cart.
    pub session_token: Option<String>,
}

/// Fields a customer may change on their profile.
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub billing: Option<Address>,
    pub shipping: Option<Address>,
}

/// Fields for `registerCustomer`.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// =============================================================================
// Order Types
// =============================================================================

/// A row in the order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub number: String,
    /// Human date ("May 1, 2024").
    pub date: String,
    pub status: OrderStatus,
    pub total: Price,
    pub item_count: u32,
}

/// One page of orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConnection {
    pub orders: Vec<OrderSummary>,
    pub page_info: OffsetPageInfo,
}

/// A line on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub name: String,
    pub slug: Option<String>,
    pub variation_name: Option<String>,
    pub quantity: u32,
    pub total: Price,
}

/// Order money totals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub discount: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

/// A full order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub key: Option<String>,
    /// Human date ("May 1, 2024").
    pub date: String,
    pub status: OrderStatus,
    pub payment_method_title: Option<String>,
    pub customer_note: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub totals: OrderTotals,
    pub billing: Address,
    pub shipping: Address,
    pub line_items: Vec<OrderLineItem>,
}

// =============================================================================
// Checkout Types
// =============================================================================

/// An enabled payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentGateway {
    pub id: String,
    pub title: String,
    /// Description (HTML, may be empty).
    pub description: String,
}

/// Data sent to the `checkout` mutation.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub payment_method: String,
    pub billing: Address,
    /// Set when shipping to a different address than billing.
    pub shipping: Option<Address>,
    pub customer_note: Option<String>,
    pub shipping_method: Option<String>,
}

/// Outcome of the `checkout` mutation.
#[derive(Debug, Clone)]
pub struct CheckoutResult {
    pub order: Order,
    /// Gateway URL to send the shopper to (off-site payment).
    pub redirect: Option<String>,
}

// =============================================================================
// Site Types
// =============================================================================

/// A navigation menu entry, nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i32,
    pub label: String,
    /// Storefront-relative path when the target is on the WordPress site,
    /// otherwise the absolute URL.
    pub href: String,
    pub children: Vec<MenuItem>,
}

/// Store-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use woo_headless_core::CurrencyCode;

    fn price(amount: &str) -> Price {
        Price::parse(amount, CurrencyCode::USD).unwrap()
    }

    #[test]
    fn test_unit_price_from_subtotal() {
        let item = CartItem {
            key: "k".to_string(),
            product_id: ProductId::new(1),
            slug: "tee".to_string(),
            name: "Tee".to_string(),
            variation_id: None,
            variation_label: None,
            quantity: Quantity::new(3).unwrap(),
            subtotal: price("30.00"),
            total: price("27.00"),
            image: None,
        };
        assert_eq!(item.unit_price().amount, Decimal::new(1000, 2));
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::empty(CurrencyCode::EUR);
        assert!(cart.is_empty());
        assert_eq!(cart.totals.total.display(), "€0.00");
        assert!(cart.selected_shipping_rate().is_none());
    }

    #[test]
    fn test_address_lines_skip_blanks() {
        let address = Address {
            first_name: "Jo".to_string(),
            last_name: "Bloggs".to_string(),
            address_1: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postcode: "12345".to_string(),
            country: "US".to_string(),
            ..Address::default()
        };
        assert_eq!(
            address.lines(),
            vec!["Jo Bloggs", "1 Main St", "Springfield, 12345", "US"]
        );
        assert!(!address.is_blank());
        assert!(Address::default().is_blank());
    }

    #[test]
    fn test_auth_tokens_debug_redacts() {
        let tokens = AuthTokens {
            auth_token: "secret-a".to_string(),
            refresh_token: "secret-r".to_string(),
        };
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_product_kind_from_graphql() {
        assert_eq!(ProductKind::from_graphql("VARIABLE"), ProductKind::Variable);
        assert_eq!(ProductKind::from_graphql("BUNDLE"), ProductKind::Other);
    }
}
