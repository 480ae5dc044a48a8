//! Shop listing and category pages.
//!
//! Both pages share one template and one query-string grammar
//! ([`ShopQuery`]). Pagination is stateless: `?page=N` always asks the API
//! for offset `(N - 1) * per_page`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{instrument, warn};

use crate::catalog::{PageRequest, Pagination, PaginationView, ProductFilter, ShopQuery, SortOrder, filter_href};
use crate::error::Result;
use crate::filters;
use crate::middleware::Chrome;
use crate::state::AppState;
use crate::woo::{Category, ProductSummary};

/// Shop listing path.
pub const SHOP_PATH: &str = "/shop";

/// One option in the sort select.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Current filter values, for re-filling the filter form.
#[derive(Clone, Default)]
pub struct FilterView {
    pub category: String,
    pub search: String,
    pub min_price: String,
    pub max_price: String,
    pub on_sale: bool,
    pub in_stock: bool,
    pub sort_options: Vec<SortOption>,
    /// Link that clears every filter but keeps the page's base path.
    pub clear_href: String,
    pub is_narrowed: bool,
}

impl FilterView {
    fn new(filter: &ProductFilter, base_path: &str) -> Self {
        Self {
            category: filter.category.clone().unwrap_or_default(),
            search: filter.search.clone().unwrap_or_default(),
            min_price: filter
                .min_price
                .map(|d| d.normalize().to_string())
                .unwrap_or_default(),
            max_price: filter
                .max_price
                .map(|d| d.normalize().to_string())
                .unwrap_or_default(),
            on_sale: filter.on_sale,
            in_stock: filter.in_stock,
            sort_options: SortOrder::ALL
                .iter()
                .map(|sort| SortOption {
                    value: sort.as_param(),
                    label: sort.label(),
                    selected: *sort == filter.sort,
                })
                .collect(),
            clear_href: base_path.to_string(),
            is_narrowed: filter.is_narrowed(),
        }
    }
}

/// Shop listing template (also used for category pages).
#[derive(Template, WebTemplate)]
#[template(path = "pages/shop.html")]
pub struct ShopTemplate {
    pub chrome: Chrome,
    pub heading: String,
    /// Category description (HTML), on category pages.
    pub description: String,
    /// Form action for the filter form.
    pub base_path: String,
    pub products: Vec<ProductSummary>,
    pub pagination: PaginationView,
    pub filters: FilterView,
    /// Top-level categories for the sidebar.
    pub categories: Vec<Category>,
    /// Whether the category select is shown (not on category pages).
    pub show_category_filter: bool,
}

/// A listing request resolved to either a page or a redirect.
enum Listing {
    Page {
        products: Vec<ProductSummary>,
        pagination: PaginationView,
    },
    Redirect(String),
}

/// Fetch one page of a listing, or the redirect for an out-of-range page.
async fn load_listing(
    state: &AppState,
    filter: &ProductFilter,
    requested_page: Option<u32>,
    href: impl Fn(u32) -> String,
) -> Result<Listing> {
    let page = PageRequest::new(requested_page, state.config().woo.products_per_page);
    let connection = state.woo().get_products(filter, page).await?;
    let pagination = Pagination::from_page_info(page, &connection.page_info);

    if let Some(last) = pagination.redirect_target() {
        return Ok(Listing::Redirect(href(last)));
    }

    Ok(Listing::Page {
        products: connection.products,
        pagination: pagination.view(href),
    })
}

/// Sidebar categories; failure leaves the sidebar empty.
async fn sidebar_categories(state: &AppState) -> Vec<Category> {
    state
        .woo()
        .get_categories()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load categories");
            Vec::new()
        })
        .into_iter()
        .filter(|c| c.parent_id.is_none() && c.count > 0)
        .collect()
}

/// Display the shop listing.
#[instrument(skip(state, chrome))]
pub async fn index(
    State(state): State<AppState>,
    chrome: Chrome,
    Query(query): Query<ShopQuery>,
) -> Result<Response> {
    let filter = query.filter();
    let href = |page| query.href(SHOP_PATH, page);

    let (listing, categories) = tokio::join!(
        load_listing(&state, &filter, query.page(), href),
        sidebar_categories(&state)
    );

    let (products, pagination) = match listing? {
        Listing::Redirect(location) => return Ok(Redirect::to(&location).into_response()),
        Listing::Page {
            products,
            pagination,
        } => (products, pagination),
    };

    let heading = filter.search.as_ref().map_or_else(
        || "Shop".to_string(),
        |q| format!("Search results for “{q}”"),
    );

    Ok(ShopTemplate {
        chrome,
        heading,
        description: String::new(),
        base_path: SHOP_PATH.to_string(),
        products,
        pagination,
        filters: FilterView::new(&filter, SHOP_PATH),
        categories,
        show_category_filter: true,
    }
    .into_response())
}

/// Display a category listing.
#[instrument(skip(state, chrome, query), fields(slug = %slug))]
pub async fn category(
    State(state): State<AppState>,
    chrome: Chrome,
    Path(slug): Path<String>,
    Query(query): Query<ShopQuery>,
) -> Result<Response> {
    let category = state.woo().get_category_by_slug(&slug).await?;

    let base_path = format!("/product-category/{}", category.slug);
    let filter = query.filter().with_category(&category.slug);
    let href = |page| filter_href(&filter, &base_path, page, true);

    let (listing, categories) = tokio::join!(
        load_listing(&state, &filter, query.page(), href),
        sidebar_categories(&state)
    );

    let (products, pagination) = match listing? {
        Listing::Redirect(location) => return Ok(Redirect::to(&location).into_response()),
        Listing::Page {
            products,
            pagination,
        } => (products, pagination),
    };

    Ok(ShopTemplate {
        chrome,
        heading: category.name,
        description: category.description,
        filters: FilterView::new(&filter, &base_path),
        base_path,
        products,
        pagination,
        categories,
        show_category_filter: false,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_filter_view_marks_selected_sort() {
        let filter = ProductFilter {
            sort: SortOrder::PriceDesc,
            min_price: Some(Decimal::new(500, 2)),
            on_sale: true,
            ..ProductFilter::default()
        };
        let view = FilterView::new(&filter, SHOP_PATH);

        let selected: Vec<_> = view
            .sort_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, vec!["price-desc"]);
        assert_eq!(view.min_price, "5");
        assert!(view.max_price.is_empty());
        assert!(view.on_sale);
        assert!(view.is_narrowed);
    }
}
