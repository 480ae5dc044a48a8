//! WooGraphQL smoke check.
//!
//! Runs the same cached reads the storefront makes on every page and logs
//! what came back, so a misconfigured endpoint or a missing plugin shows up
//! before deploy.

use woo_headless_storefront::config::WooConfig;
use woo_headless_storefront::woo::WooClient;

use super::CommandError;

/// Query site settings, categories and the first featured products.
///
/// # Errors
///
/// Returns an error when the configuration is incomplete or any query fails.
pub async fn run() -> Result<(), CommandError> {
    let config = WooConfig::from_env()?;
    tracing::info!(endpoint = %config.graphql_url, "Checking WooGraphQL endpoint");

    let client = WooClient::new(&config);

    let settings = client.get_site_settings().await?;
    tracing::info!(title = %settings.title, "Site settings OK");

    let categories = client.get_categories().await?;
    tracing::info!(count = categories.len(), "Product categories OK");

    let featured = client.get_featured_products(4).await?;
    tracing::info!(count = featured.len(), "Featured products OK");

    Ok(())
}
