//! Navigation menus and general settings.

use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::conversions::{build_menu_tree, convert_site_settings};
use super::queries::NoVariables;
use super::queries::site::{GetMenu, GetSiteSettings, get_menu};
use super::types::{MenuItem, SiteSettings};
use super::{WooClient, WooError};

impl WooClient {
    /// Get a navigation menu by location (`PRIMARY`, `FOOTER`), as a tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_menu(&self, location: &str) -> Result<Vec<MenuItem>, WooError> {
        let cache_key = CacheKey::Menu(location.to_string());

        if let Some(CacheValue::Menu(menu)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for menu");
            return Ok(menu);
        }

        let variables = get_menu::Variables {
            location: location.to_string(),
        };
        let data = self.query::<GetMenu>(variables).await?;
        let menu = build_menu_tree(data.menu_items.map(|m| m.nodes).unwrap_or_default());

        self.inner
            .cache
            .insert(cache_key, CacheValue::Menu(menu.clone()))
            .await;

        Ok(menu)
    }

    /// Get the site title and tagline.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_site_settings(&self) -> Result<SiteSettings, WooError> {
        if let Some(CacheValue::SiteSettings(settings)) =
            self.inner.cache.get(&CacheKey::SiteSettings).await
        {
            debug!("Cache hit for site settings");
            return Ok(settings);
        }

        let data = self.query::<GetSiteSettings>(NoVariables {}).await?;
        let settings = convert_site_settings(data.general_settings);

        self.inner
            .cache
            .insert(
                CacheKey::SiteSettings,
                CacheValue::SiteSettings(settings.clone()),
            )
            .await;

        Ok(settings)
    }
}
