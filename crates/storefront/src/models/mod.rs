//! Session models for the storefront.

pub mod session;

pub use session::{CustomerSession, Flash, OrderReceipt, keys as session_keys};
