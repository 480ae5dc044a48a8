//! Conversions from raw GraphQL response structs to domain types.

mod cart;
mod catalog;
mod customer;
mod site;

pub use cart::convert_cart;
pub use catalog::{
    convert_category, convert_product, convert_product_connection, convert_product_list,
};
pub use customer::{
    convert_address_input, convert_auth_payload, convert_customer, convert_order,
    convert_order_connection,
};
pub use site::{build_menu_tree, convert_site_settings};

use woo_headless_core::{CurrencyCode, Price, PriceRange};

use super::queries::{ImageFields, OffsetPageInfoFields};
use super::types::{Image, OffsetPageInfo};

/// Parse an optional money string, treating blanks and junk as absent.
fn parse_price(raw: Option<&str>, currency: CurrencyCode) -> Option<Price> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match Price::parse(raw, currency) {
        Ok(price) => Some(price),
        Err(e) => {
            tracing::warn!(raw, error = %e, "Unparseable price from WooGraphQL");
            None
        }
    }
}

/// Parse an optional money string, defaulting to zero.
fn price_or_zero(raw: Option<&str>, currency: CurrencyCode) -> Price {
    parse_price(raw, currency).unwrap_or_else(|| Price::zero(currency))
}

fn parse_price_range(raw: Option<&str>, currency: CurrencyCode) -> Option<PriceRange> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    PriceRange::parse(raw, currency).ok()
}

fn convert_image(image: Option<ImageFields>) -> Option<Image> {
    let image = image?;
    let url = image.source_url.filter(|url| !url.is_empty())?;
    Some(Image {
        url,
        alt: image.alt_text.unwrap_or_default(),
    })
}

fn convert_page_info(page_info: OffsetPageInfoFields) -> OffsetPageInfo {
    page_info
        .offset_pagination
        .map(|p| OffsetPageInfo {
            total: p
                .total
                .and_then(|t| u32::try_from(t).ok())
                .unwrap_or_default(),
            has_more: p.has_more,
            has_previous: p.has_previous,
        })
        .unwrap_or_default()
}

/// Render a WPGraphQL date (`2024-05-01T12:00:00`, site-local) as "May 1, 2024".
fn human_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%B %-d, %Y").to_string();
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%B %-d, %Y").to_string();
    }
    raw.to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
