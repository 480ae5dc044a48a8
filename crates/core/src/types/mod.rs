//! Core types for Woo Headless.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError, PriceRange};
pub use quantity::{Quantity, QuantityError};
pub use status::*;
