//! WooCommerce headless storefront library.
//!
//! Server-rendered pages (Askama + htmx) over the WooGraphQL API. The
//! binary in `main.rs` only loads configuration and serves
//! [`app::build_router`]; everything else lives here so the integration
//! tests can drive the real router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod woo;
