//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Customer session lifecycle and JWT refresh
//! - `cart` - Cart session token persistence and add-to-cart resolution
//! - `flash` - Notices carried across a redirect

pub mod auth;
pub mod cart;
pub mod flash;
