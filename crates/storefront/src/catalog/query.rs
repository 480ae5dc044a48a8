//! Shop listing query parameters.
//!
//! Everything is parsed leniently: a malformed `min_price` or `sort` is
//! ignored rather than answered with a 400, so hand-edited URLs still list
//! products.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Raw `?page=&category=&q=&sort=&min_price=&max_price=&on_sale=&in_stock=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopQuery {
    pub page: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub on_sale: Option<String>,
    pub in_stock: Option<String>,
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Shop manager's menu order.
    #[default]
    Default,
    Popularity,
    Rating,
    Latest,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// All orders, in select-box order.
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::Popularity,
        Self::Rating,
        Self::Latest,
        Self::PriceAsc,
        Self::PriceDesc,
    ];

    /// Parse a `sort` parameter; unknown values fall back to default.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim).unwrap_or_default() {
            "popularity" => Self::Popularity,
            "rating" => Self::Rating,
            "latest" | "date" => Self::Latest,
            "price-asc" | "price" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            _ => Self::Default,
        }
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Popularity => "popularity",
            Self::Rating => "rating",
            Self::Latest => "latest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
        }
    }

    /// Human label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Default => "Default sorting",
            Self::Popularity => "Sort by popularity",
            Self::Rating => "Sort by average rating",
            Self::Latest => "Sort by latest",
            Self::PriceAsc => "Sort by price: low to high",
            Self::PriceDesc => "Sort by price: high to low",
        }
    }

    /// `ProductsOrderByEnum` field and `OrderEnum` direction.
    #[must_use]
    pub const fn orderby(&self) -> (&'static str, &'static str) {
        match self {
            Self::Default => ("MENU_ORDER", "ASC"),
            Self::Popularity => ("TOTAL_SALES", "DESC"),
            Self::Rating => ("RATING", "DESC"),
            Self::Latest => ("DATE", "DESC"),
            Self::PriceAsc => ("PRICE", "ASC"),
            Self::PriceDesc => ("PRICE", "DESC"),
        }
    }
}

/// Normalized listing filter; the GraphQL `where` args are derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    /// Category slug.
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub on_sale: bool,
    pub in_stock: bool,
}

impl ProductFilter {
    /// Restrict to a category, replacing any category from the query string.
    #[must_use]
    pub fn with_category(mut self, slug: &str) -> Self {
        self.category = Some(slug.to_string());
        self
    }

    /// Whether anything beyond sort order narrows the listing.
    #[must_use]
    pub const fn is_narrowed(&self) -> bool {
        self.category.is_some()
            || self.search.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.on_sale
            || self.in_stock
    }
}

impl ShopQuery {
    /// Requested page, if it parses.
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }

    /// Requested sort order.
    #[must_use]
    pub fn sort(&self) -> SortOrder {
        SortOrder::from_param(self.sort.as_deref())
    }

    /// Build the normalized filter.
    ///
    /// Blank strings are dropped, negative prices are dropped, and a min
    /// above the max is swapped.
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        let mut min_price = parse_price_bound(self.min_price.as_deref());
        let mut max_price = parse_price_bound(self.max_price.as_deref());
        if let (Some(min), Some(max)) = (min_price, max_price)
            && min > max
        {
            std::mem::swap(&mut min_price, &mut max_price);
        }

        ProductFilter {
            category: non_blank(self.category.as_deref()),
            search: non_blank(self.q.as_deref()),
            sort: self.sort(),
            min_price,
            max_price,
            on_sale: is_truthy(self.on_sale.as_deref()),
            in_stock: is_truthy(self.in_stock.as_deref()),
        }
    }

    /// Canonical link to `page` of this listing under `base_path`.
    ///
    /// Parameters are emitted in a fixed order and URL-encoded; defaults
    /// (page 1, default sort) are omitted so equal listings share one URL.
    #[must_use]
    pub fn href(&self, base_path: &str, page: u32) -> String {
        filter_href(&self.filter(), base_path, page, base_path != "/shop")
    }
}

/// Canonical link for a filter.
///
/// `category_in_path` skips the `category` parameter on category pages,
/// where the slug is part of the path.
#[must_use]
pub fn filter_href(filter: &ProductFilter, base_path: &str, page: u32, category_in_path: bool) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    if !category_in_path && let Some(category) = &filter.category {
        params.push(("category", category.clone()));
    }
    if let Some(search) = &filter.search {
        params.push(("q", search.clone()));
    }
    if filter.sort != SortOrder::Default {
        params.push(("sort", filter.sort.as_param().to_string()));
    }
    if let Some(min) = filter.min_price {
        params.push(("min_price", min.normalize().to_string()));
    }
    if let Some(max) = filter.max_price {
        params.push(("max_price", max.normalize().to_string()));
    }
    if filter.on_sale {
        params.push(("on_sale", "1".to_string()));
    }
    if filter.in_stock {
        params.push(("in_stock", "1".to_string()));
    }
    if page > 1 {
        params.push(("page", page.to_string()));
    }

    if params.is_empty() {
        return base_path.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base_path}?{query}")
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "on" | "yes")
    )
}

fn parse_price_bound(value: Option<&str>) -> Option<Decimal> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    Decimal::from_str(value)
        .ok()
        .filter(|d| !d.is_sign_negative())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ShopQuery {
        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        from_query_string(&encoded)
    }

    fn from_query_string(encoded: &str) -> ShopQuery {
        let uri: axum::http::Uri = format!("/shop?{encoded}")
            .parse()
            .unwrap_or_else(|_| panic!("valid uri"));
        axum::extract::Query::<ShopQuery>::try_from_uri(&uri)
            .unwrap_or_else(|_| panic!("valid query"))
            .0
    }

    #[test]
    fn test_filter_normalizes_input() {
        let q = query(&[
            ("category", "  "),
            ("q", " hoodie "),
            ("min_price", "50"),
            ("max_price", "10"),
            ("on_sale", "on"),
            ("in_stock", "0"),
            ("sort", "bogus"),
        ]);
        let filter = q.filter();
        assert_eq!(filter.category, None);
        assert_eq!(filter.search.as_deref(), Some("hoodie"));
        assert_eq!(filter.min_price, Some(Decimal::from(10)));
        assert_eq!(filter.max_price, Some(Decimal::from(50)));
        assert!(filter.on_sale);
        assert!(!filter.in_stock);
        assert_eq!(filter.sort, SortOrder::Default);
    }

    #[test]
    fn test_negative_and_junk_prices_dropped() {
        let filter = query(&[("min_price", "-5"), ("max_price", "abc")]).filter();
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, None);
        assert!(!filter.is_narrowed());
    }

    #[test]
    fn test_page_parsing_is_lenient() {
        assert_eq!(query(&[("page", "3")]).page(), Some(3));
        assert_eq!(query(&[("page", "x")]).page(), None);
        assert_eq!(query(&[]).page(), None);
    }

    #[test]
    fn test_href_preserves_filters() {
        let q = query(&[
            ("category", "t-shirts"),
            ("q", "red & blue"),
            ("sort", "price-desc"),
            ("page", "2"),
        ]);
        assert_eq!(
            q.href("/shop", 3),
            "/shop?category=t-shirts&q=red%20%26%20blue&sort=price-desc&page=3"
        );
        assert_eq!(
            q.href("/shop", 1),
            "/shop?category=t-shirts&q=red%20%26%20blue&sort=price-desc"
        );
        assert_eq!(ShopQuery::default().href("/shop", 1), "/shop");
    }

    #[test]
    fn test_href_on_category_page_omits_category() {
        let q = query(&[("category", "ignored"), ("on_sale", "1")]);
        assert_eq!(q.href("/category/hoodies", 2), "/category/hoodies?on_sale=1&page=2");
    }

    #[test]
    fn test_sort_round_trip_params() {
        for sort in SortOrder::ALL {
            assert_eq!(SortOrder::from_param(Some(sort.as_param())), sort);
        }
        assert_eq!(SortOrder::PriceDesc.orderby(), ("PRICE", "DESC"));
    }

    #[test]
    fn test_with_category_overrides() {
        let filter = query(&[("category", "a")]).filter().with_category("b");
        assert_eq!(filter.category.as_deref(), Some("b"));
        assert!(filter.is_narrowed());
    }
}
