//! Woo Headless Core - Shared domain types.
//!
//! This crate provides the types shared by the Woo Headless components:
//! - `storefront` - Public-facing e-commerce site
//! - `cli` - Operator tooling (session migrations, API checks)
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP clients. Every entity here is owned by the remote
//! WooCommerce backend; these types only give its values a checked shape.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities, emails and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
