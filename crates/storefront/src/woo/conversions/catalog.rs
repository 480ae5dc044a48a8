//! Product and category conversions.

use woo_headless_core::{CategoryId, CurrencyCode, ProductId, VariationId};

use crate::woo::queries::Nodes;
use crate::woo::queries::catalog::{
    CategoryFields, ProductCardFields, get_product_by_slug, get_products,
};
use crate::woo::types::{
    Category, CategoryRef, Product, ProductAttribute, ProductConnection, ProductKind,
    ProductSummary, Variation, VariationAttribute,
};

use super::{convert_image, convert_page_info, non_empty, parse_price, parse_price_range};

/// Convert a product card.
pub fn convert_product_summary(card: ProductCardFields, currency: CurrencyCode) -> ProductSummary {
    let price = parse_price_range(card.price.as_deref(), currency);
    let regular_price = if card.on_sale {
        parse_price_range(card.regular_price.as_deref(), currency)
    } else {
        None
    };

    ProductSummary {
        id: ProductId::new(card.database_id),
        slug: card.slug.unwrap_or_default(),
        name: card.name.unwrap_or_default(),
        kind: card
            .product_type
            .as_deref()
            .map(ProductKind::from_graphql)
            .unwrap_or_default(),
        price,
        regular_price,
        on_sale: card.on_sale,
        stock_status: card.stock_status.unwrap_or_default(),
        image: convert_image(card.image),
        short_description: card.short_description.unwrap_or_default(),
        average_rating: card.average_rating.unwrap_or_default(),
        review_count: card.review_count.unwrap_or_default(),
    }
}

/// Convert a page of products.
pub fn convert_product_connection(
    products: Option<get_products::Products>,
    currency: CurrencyCode,
) -> ProductConnection {
    let Some(products) = products else {
        return ProductConnection {
            products: Vec::new(),
            page_info: super::OffsetPageInfo::default(),
        };
    };

    ProductConnection {
        products: products
            .nodes
            .into_iter()
            .map(|card| convert_product_summary(card, currency))
            .collect(),
        page_info: convert_page_info(products.page_info),
    }
}

/// Convert a list of product cards.
pub fn convert_product_list(
    nodes: Option<Nodes<ProductCardFields>>,
    currency: CurrencyCode,
) -> Vec<ProductSummary> {
    nodes
        .map(|n| n.nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|card| convert_product_summary(card, currency))
        .collect()
}

/// Convert a full product.
pub fn convert_product(
    product: get_product_by_slug::ProductDetail,
    currency: CurrencyCode,
) -> Product {
    let attributes = product
        .attributes
        .map(|a| a.nodes)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|attribute| {
            let name = non_empty(attribute.name)?;
            Some(ProductAttribute {
                label: non_empty(attribute.label).unwrap_or_else(|| attribute_label(&name)),
                name,
                options: attribute.options,
                used_for_variations: attribute.variation,
            })
        })
        .collect();

    let variations = product
        .variations
        .map(|v| v.nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|variation| convert_variation(variation, currency))
        .collect();

    let categories = product
        .product_categories
        .map(|c| c.nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|category| CategoryRef {
            id: CategoryId::new(category.database_id),
            name: category.name.unwrap_or_default(),
            slug: category.slug.unwrap_or_default(),
        })
        .collect();

    let gallery = product
        .gallery_images
        .map(|g| g.nodes)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|image| convert_image(Some(image)))
        .collect();

    Product {
        description: product.description.unwrap_or_default(),
        sku: non_empty(product.sku),
        gallery,
        categories,
        stock_quantity: product.stock_quantity,
        attributes,
        variations,
        related: convert_product_list(product.related, currency),
        summary: convert_product_summary(product.card, currency),
    }
}

fn convert_variation(
    variation: get_product_by_slug::Variation,
    currency: CurrencyCode,
) -> Variation {
    Variation {
        id: VariationId::new(variation.database_id),
        name: variation.name.unwrap_or_default(),
        sku: non_empty(variation.sku),
        price: parse_price(variation.price.as_deref(), currency),
        regular_price: parse_price(variation.regular_price.as_deref(), currency),
        sale_price: parse_price(variation.sale_price.as_deref(), currency),
        stock_status: variation.stock_status.unwrap_or_default(),
        stock_quantity: variation.stock_quantity,
        image: convert_image(variation.image),
        attributes: variation
            .attributes
            .map(|a| a.nodes)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|attribute| {
                Some(VariationAttribute {
                    name: non_empty(attribute.name)?,
                    value: attribute.value.unwrap_or_default(),
                })
            })
            .collect(),
    }
}

/// Convert a category.
pub fn convert_category(category: CategoryFields) -> Category {
    Category {
        id: CategoryId::new(category.database_id),
        name: category.name.unwrap_or_default(),
        slug: category.slug.unwrap_or_default(),
        description: category.description.unwrap_or_default(),
        count: category
            .count
            .and_then(|c| u32::try_from(c).ok())
            .unwrap_or_default(),
        parent_id: category
            .parent_database_id
            .filter(|id| *id > 0)
            .map(CategoryId::new),
        image: convert_image(category.image),
    }
}

/// `pa_shirt-size` -> `Shirt size`.
fn attribute_label(name: &str) -> String {
    let bare = name.strip_prefix("pa_").unwrap_or(name).replace(['-', '_'], " ");
    let mut chars = bare.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use woo_headless_core::StockStatus;

    fn card(json: serde_json::Value) -> ProductCardFields {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_summary_regular_price_only_when_on_sale() {
        let summary = convert_product_summary(
            card(serde_json::json!({
                "databaseId": 3,
                "slug": "cap",
                "name": "Cap",
                "type": "SIMPLE",
                "onSale": false,
                "price": "15.00",
                "regularPrice": "15.00"
            })),
            CurrencyCode::USD,
        );
        assert_eq!(summary.price.unwrap().display(), "$15.00");
        assert!(summary.regular_price.is_none());
        assert_eq!(summary.stock_status, StockStatus::InStock);
        assert!(summary.is_simple_purchase());

        let summary = convert_product_summary(
            card(serde_json::json!({
                "databaseId": 4,
                "type": "VARIABLE",
                "onSale": true,
                "price": "10.00, 20.00",
                "regularPrice": "12.00, 25.00",
                "stockStatus": "OUT_OF_STOCK"
            })),
            CurrencyCode::USD,
        );
        assert_eq!(summary.price.unwrap().display(), "$10.00 – $20.00");
        assert!(summary.regular_price.is_some());
        assert!(!summary.is_simple_purchase());
    }

    #[test]
    fn test_category_root_has_no_parent() {
        let category = convert_category(
            serde_json::from_value(serde_json::json!({
                "databaseId": 9,
                "name": "Hoodies",
                "slug": "hoodies",
                "count": 4,
                "parentDatabaseId": 0
            }))
            .unwrap(),
        );
        assert!(category.parent_id.is_none());
        assert_eq!(category.count, 4);
    }

    #[test]
    fn test_attribute_label_fallback() {
        assert_eq!(attribute_label("pa_shirt-size"), "Shirt size");
        assert_eq!(attribute_label("Color"), "Color");
        assert_eq!(attribute_label(""), "");
    }

    #[test]
    fn test_product_variations_and_attributes() {
        let detail: get_product_by_slug::ProductDetail = serde_json::from_value(serde_json::json!({
            "databaseId": 7,
            "slug": "tee",
            "name": "Tee",
            "type": "VARIABLE",
            "sku": "",
            "attributes": { "nodes": [
                { "name": "pa_color", "label": null, "options": ["red", "blue"], "variation": true },
                { "name": "material", "label": "Material", "options": ["cotton"], "variation": false }
            ]},
            "variations": { "nodes": [
                { "databaseId": 8, "price": "10.00", "stockStatus": "IN_STOCK",
                  "attributes": { "nodes": [{ "name": "pa_color", "value": "red" }] } },
                { "databaseId": 9, "price": "11.00", "stockStatus": "OUT_OF_STOCK",
                  "attributes": { "nodes": [{ "name": "pa_color", "value": "" }] } }
            ]}
        }))
        .unwrap();

        let product = convert_product(detail, CurrencyCode::USD);
        assert!(product.sku.is_none());
        assert_eq!(product.variation_attributes().count(), 1);
        assert_eq!(product.attributes[0].label, "Color");
        assert_eq!(product.variations.len(), 2);
        assert_eq!(product.variations[1].attributes[0].value, "");
        assert_eq!(product.variations[0].price.unwrap().display(), "$10.00");
    }
}
