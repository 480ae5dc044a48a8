//! Cache types for catalog responses.
//!
//! Only idempotent, customer-independent reads are cached. Losing the cache
//! costs a refetch and nothing else.

use crate::catalog::{PageRequest, ProductFilter};

use super::types::{
    Category, MenuItem, PaymentGateway, Product, ProductConnection, ProductSummary, SiteSettings,
};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products {
        filter: ProductFilter,
        page: PageRequest,
    },
    Featured(u32),
    Categories,
    Category(String),
    Menu(String),
    PaymentGateways,
    SiteSettings,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductConnection),
    ProductList(Vec<ProductSummary>),
    Categories(Vec<Category>),
    Category(Box<Category>),
    Menu(Vec<MenuItem>),
    PaymentGateways(Vec<PaymentGateway>),
    SiteSettings(SiteSettings),
}
