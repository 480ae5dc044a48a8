//! CLI subcommands.

pub mod check_api;
pub mod migrate;

use thiserror::Error;
use woo_headless_storefront::config::ConfigError;
use woo_headless_storefront::woo::WooError;

/// Errors from any subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("WooCommerce API error: {0}")]
    Woo(#[from] WooError),
}
