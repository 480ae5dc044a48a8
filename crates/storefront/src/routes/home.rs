//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::{instrument, warn};

use crate::filters;
use crate::middleware::Chrome;
use crate::state::AppState;
use crate::woo::{Category, ProductSummary};

/// Featured products shown on the home page.
const FEATURED_COUNT: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    pub featured: Vec<ProductSummary>,
    /// Top-level, non-empty categories.
    pub categories: Vec<Category>,
}

/// Display the home page.
///
/// Featured products and categories are fetched concurrently. Either one
/// failing leaves its section empty rather than failing the page.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, chrome: Chrome) -> HomeTemplate {
    let (featured, categories) = tokio::join!(
        state.woo().get_featured_products(FEATURED_COUNT),
        state.woo().get_categories()
    );

    let featured = featured.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load featured products");
        Vec::new()
    });
    let categories = categories
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load categories");
            Vec::new()
        })
        .into_iter()
        .filter(|c| c.parent_id.is_none() && c.count > 0)
        .collect();

    HomeTemplate {
        chrome,
        featured,
        categories,
    }
}
