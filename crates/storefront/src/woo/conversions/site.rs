//! Menu and settings conversions.

use std::collections::HashMap;

use crate::woo::queries::site::{get_menu, get_site_settings};
use crate::woo::types::{MenuItem, SiteSettings};

/// Nest flat WPGraphQL menu items by parent id, ordered by `order`.
///
/// Items whose parent is missing from the list are promoted to the top level.
pub fn build_menu_tree(mut items: Vec<get_menu::MenuItem>) -> Vec<MenuItem> {
    items.sort_by_key(|item| (item.order.unwrap_or(i32::MAX), item.database_id));

    let known: Vec<i32> = items.iter().map(|item| item.database_id).collect();
    let mut children: HashMap<i32, Vec<get_menu::MenuItem>> = HashMap::new();
    let mut roots = Vec::new();

    for item in items {
        match item.parent_database_id.filter(|p| *p > 0 && known.contains(p)) {
            Some(parent) => children.entry(parent).or_default().push(item),
            None => roots.push(item),
        }
    }

    roots
        .into_iter()
        .map(|item| attach(item, &mut children, 0))
        .collect()
}

/// Menus deeper than this are flattened; WordPress allows arbitrary nesting.
const MAX_DEPTH: usize = 3;

fn attach(
    item: get_menu::MenuItem,
    children: &mut HashMap<i32, Vec<get_menu::MenuItem>>,
    depth: usize,
) -> MenuItem {
    let kids = if depth < MAX_DEPTH {
        children
            .remove(&item.database_id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach(child, children, depth + 1))
            .collect()
    } else {
        Vec::new()
    };

    MenuItem {
        id: item.database_id,
        label: item.label.unwrap_or_default(),
        href: storefront_href(item.path.as_deref(), item.url.as_deref()),
        children: kids,
    }
}

/// Map a WordPress permalink onto the storefront's own routes.
///
/// WooCommerce permalinks (`/product/x/`, `/product-category/x/`, `/shop/`,
/// `/cart/`, `/checkout/`, `/my-account/`) become local paths; anything else
/// keeps its absolute URL.
fn storefront_href(path: Option<&str>, url: Option<&str>) -> String {
    let path = path.unwrap_or_default().trim();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] if !path.is_empty() => return "/".to_string(),
        ["shop", ..] => return "/shop".to_string(),
        ["product", slug, ..] => return format!("/products/{slug}"),
        ["product-category", .., slug] => return format!("/category/{slug}"),
        ["cart", ..] => return "/cart".to_string(),
        ["checkout", ..] => return "/checkout".to_string(),
        ["my-account", ..] => return "/account".to_string(),
        _ => {}
    }

    match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => url.to_string(),
        None if !path.is_empty() => path.to_string(),
        None => "#".to_string(),
    }
}

/// Convert general settings.
pub fn convert_site_settings(settings: Option<get_site_settings::GeneralSettings>) -> SiteSettings {
    settings
        .map(|s| SiteSettings {
            title: s.title.unwrap_or_default(),
            description: s.description.unwrap_or_default(),
        })
        .unwrap_or_default()
}
