//! Catalog operations (`graphql/catalog.graphql`).

use serde::{Deserialize, Serialize};
use woo_headless_core::StockStatus;

use super::{ImageFields, Nodes, OffsetPageInfoFields, OffsetPaginationInput, graphql_operation};

const DOCUMENT: &str = include_str!("../../../graphql/catalog.graphql");

graphql_operation!(GetProducts, get_products, DOCUMENT);
graphql_operation!(GetFeaturedProducts, get_featured_products, DOCUMENT);
graphql_operation!(SearchProducts, search_products, DOCUMENT);
graphql_operation!(GetProductBySlug, get_product_by_slug, DOCUMENT);
graphql_operation!(GetCategories, get_categories, DOCUMENT);
graphql_operation!(GetCategoryBySlug, get_category_by_slug, DOCUMENT);

/// `ProductCardFields` fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCardFields {
    pub database_id: i32,
    pub slug: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    #[serde(default)]
    pub on_sale: bool,
    pub average_rating: Option<f64>,
    pub review_count: Option<i32>,
    pub short_description: Option<String>,
    pub image: Option<ImageFields>,
    pub price: Option<String>,
    pub regular_price: Option<String>,
    pub stock_status: Option<StockStatus>,
}

/// `ProductsOrderbyInput`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductsOrderby {
    pub field: &'static str,
    pub order: &'static str,
}

/// `RootQueryToProductUnionConnectionWhereArgs` (the subset in use).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWhereArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orderby: Vec<ProductsOrderby>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_sale: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stock_status: Vec<StockStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_pagination: Option<OffsetPaginationInput>,
}

pub mod get_products {
    use super::{Deserialize, OffsetPageInfoFields, ProductCardFields, ProductWhereArgs, Serialize};

    #[derive(Debug, Clone, Default, Serialize)]
    pub struct Variables {
        #[serde(rename = "where")]
        pub where_: ProductWhereArgs,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Option<Products>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Products {
        #[serde(default)]
        pub page_info: OffsetPageInfoFields,
        #[serde(default)]
        pub nodes: Vec<ProductCardFields>,
    }
}

pub mod get_featured_products {
    use super::{Deserialize, Nodes, ProductCardFields, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Option<Nodes<ProductCardFields>>,
    }
}

pub mod search_products {
    use super::{Deserialize, Nodes, ProductCardFields, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub search: String,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Option<Nodes<ProductCardFields>>,
    }
}

pub mod get_product_by_slug {
    use super::{Deserialize, ImageFields, Nodes, ProductCardFields, Serialize, StockStatus};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub slug: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductDetail>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductDetail {
        #[serde(flatten)]
        pub card: ProductCardFields,
        pub description: Option<String>,
        pub sku: Option<String>,
        pub gallery_images: Option<Nodes<ImageFields>>,
        pub product_categories: Option<Nodes<CategoryRef>>,
        pub stock_quantity: Option<i32>,
        pub attributes: Option<Nodes<Attribute>>,
        pub variations: Option<Nodes<Variation>>,
        pub related: Option<Nodes<ProductCardFields>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryRef {
        pub database_id: i32,
        pub name: Option<String>,
        pub slug: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Attribute {
        pub name: Option<String>,
        pub label: Option<String>,
        #[serde(default)]
        pub options: Vec<String>,
        #[serde(default)]
        pub variation: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variation {
        pub database_id: i32,
        pub name: Option<String>,
        pub sku: Option<String>,
        pub price: Option<String>,
        pub regular_price: Option<String>,
        pub sale_price: Option<String>,
        pub stock_status: Option<StockStatus>,
        pub stock_quantity: Option<i32>,
        pub image: Option<ImageFields>,
        pub attributes: Option<Nodes<VariationAttribute>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct VariationAttribute {
        pub name: Option<String>,
        pub value: Option<String>,
    }
}

/// Category fields shared by `GetCategories` and `GetCategoryBySlug`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFields {
    pub database_id: i32,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub count: Option<i32>,
    pub parent_database_id: Option<i32>,
    pub image: Option<ImageFields>,
}

pub mod get_categories {
    use super::{CategoryFields, Deserialize, Nodes};

    pub type Variables = super::super::NoVariables;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_categories: Option<Nodes<CategoryFields>>,
    }
}

pub mod get_category_by_slug {
    use super::{CategoryFields, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub slug: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_category: Option<CategoryFields>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_where_args_skip_unset_fields() {
        let args = ProductWhereArgs {
            category: Some("hoodies".to_string()),
            offset_pagination: Some(OffsetPaginationInput { offset: 24, size: 12 }),
            ..ProductWhereArgs::default()
        };
        let json = serde_json::to_value(get_products::Variables { where_: args }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "where": {
                    "category": "hoodies",
                    "offsetPagination": { "offset": 24, "size": 12 }
                }
            })
        );
    }

    #[test]
    fn test_product_detail_merges_inline_fragments() {
        let json = serde_json::json!({
            "product": {
                "databaseId": 7,
                "slug": "tee",
                "name": "Tee",
                "type": "VARIABLE",
                "onSale": false,
                "price": "10.00, 12.00",
                "stockStatus": "IN_STOCK",
                "attributes": { "nodes": [
                    { "name": "pa_color", "label": "Color", "options": ["red", "blue"], "variation": true }
                ]},
                "variations": { "nodes": [
                    { "databaseId": 8, "price": "10.00", "attributes": { "nodes": [
                        { "name": "pa_color", "value": "red" }
                    ]}}
                ]}
            }
        });
        let data: get_product_by_slug::ResponseData = serde_json::from_value(json).unwrap();
        let product = data.product.unwrap();
        assert_eq!(product.card.database_id, 7);
        assert_eq!(product.card.product_type.as_deref(), Some("VARIABLE"));
        assert_eq!(product.attributes.unwrap().nodes.len(), 1);
        assert_eq!(product.variations.unwrap().nodes[0].database_id, 8);
        assert!(product.related.is_none());
    }
}
