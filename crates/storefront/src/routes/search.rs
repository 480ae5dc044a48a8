//! Search page and the HTMX suggestion dropdown.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::catalog::{PageRequest, Pagination, PaginationView, ProductFilter, filter_href};
use crate::error::Result;
use crate::filters;
use crate::middleware::Chrome;
use crate::state::AppState;
use crate::woo::ProductSummary;

/// Search page path.
pub const SEARCH_PATH: &str = "/search";

/// Shortest query that triggers suggestions.
pub const MIN_SUGGEST_LENGTH: usize = 2;

/// Suggestions shown in the dropdown.
const SUGGESTION_COUNT: u32 = 6;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

impl SearchQuery {
    fn page(&self) -> Option<u32> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }

    fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub chrome: Chrome,
    pub query: String,
    pub products: Vec<ProductSummary>,
    pub pagination: PaginationView,
}

/// Suggestion dropdown fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_suggestions.html")]
pub struct SuggestionsTemplate {
    pub query: String,
    pub products: Vec<ProductSummary>,
}

/// Display search results.
#[instrument(skip(state, chrome))]
pub async fn page(
    State(state): State<AppState>,
    chrome: Chrome,
    Query(query): Query<SearchQuery>,
) -> Result<Response> {
    let Some(term) = query.term() else {
        return Ok(SearchTemplate {
            chrome,
            query: String::new(),
            products: Vec::new(),
            pagination: Pagination::new(PageRequest::new(None, 1), 0)
                .view(|_| SEARCH_PATH.to_string()),
        }
        .into_response());
    };

    let filter = ProductFilter {
        search: Some(term.to_string()),
        ..ProductFilter::default()
    };
    let href = |page| filter_href(&filter, SEARCH_PATH, page, false);

    let request = PageRequest::new(query.page(), state.config().woo.products_per_page);
    let connection = state.woo().get_products(&filter, request).await?;
    let pagination = Pagination::from_page_info(request, &connection.page_info);

    if let Some(last) = pagination.redirect_target() {
        return Ok(Redirect::to(&href(last)).into_response());
    }

    Ok(SearchTemplate {
        chrome,
        query: term.to_string(),
        products: connection.products,
        pagination: pagination.view(href),
    }
    .into_response())
}

/// Suggestion dropdown (HTMX, `keyup changed delay:300ms`).
///
/// Short queries and API failures render an empty dropdown.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> SuggestionsTemplate {
    let Some(term) = query
        .term()
        .filter(|q| q.chars().count() >= MIN_SUGGEST_LENGTH)
    else {
        return SuggestionsTemplate {
            query: String::new(),
            products: Vec::new(),
        };
    };

    let products = state
        .woo()
        .search_suggestions(term, SUGGESTION_COUNT)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Search suggestions failed");
            Vec::new()
        });

    SuggestionsTemplate {
        query: term.to_string(),
        products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_term_is_none() {
        let query = SearchQuery {
            q: Some("   ".to_string()),
            page: None,
        };
        assert_eq!(query.term(), None);

        let query = SearchQuery {
            q: Some(" hoodie ".to_string()),
            page: Some("x".to_string()),
        };
        assert_eq!(query.page(), None);
        assert_eq!(query.term(), Some("hoodie"));
    }

    #[test]
    fn test_search_links_keep_query() {
        let filter = ProductFilter {
            search: Some("blue hoodie".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(
            filter_href(&filter, SEARCH_PATH, 2, false),
            "/search?q=blue%20hoodie&page=2"
        );
    }
}
