//! Product detail page and the variation status fragment.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use crate::catalog::{SelectedAttributes, match_variation};
use crate::error::Result;
use crate::filters;
use crate::middleware::Chrome;
use crate::state::AppState;
use crate::woo::{Image, Product, ProductKind};

/// What the shopper's current selection resolves to.
#[derive(Debug, Clone, Default)]
pub struct VariationStatus {
    /// A purchasable variation (or simple product) is selected.
    pub ready: bool,
    pub message: String,
    pub price: Option<String>,
    /// Price before sale, when the selection is on sale.
    pub regular_price: Option<String>,
    pub sku: Option<String>,
    pub image: Option<Image>,
}

/// Resolve a selection against a product for display.
#[must_use]
pub fn variation_status(product: &Product, selected: &SelectedAttributes) -> VariationStatus {
    let summary = &product.summary;
    match summary.kind {
        ProductKind::Variable => match match_variation(&product.variations, selected) {
            Ok(variation) => {
                let ready = variation.stock_status.is_purchasable();
                let on_sale = variation.sale_price.is_some() && variation.regular_price != variation.price;
                VariationStatus {
                    ready,
                    message: variation.stock_quantity.filter(|_| ready).map_or_else(
                        || variation.stock_status.label().to_string(),
                        |n| format!("{n} in stock"),
                    ),
                    price: variation.price.map(|p| p.display()),
                    regular_price: if on_sale {
                        variation.regular_price.map(|p| p.display())
                    } else {
                        None
                    },
                    sku: variation.sku.clone(),
                    image: variation.image.clone(),
                }
            }
            Err(e) => VariationStatus {
                message: e.to_string(),
                ..VariationStatus::default()
            },
        },
        ProductKind::Simple => VariationStatus {
            ready: summary.stock_status.is_purchasable(),
            message: summary.stock_status.label().to_string(),
            price: summary.price.as_ref().map(|p| p.display()),
            regular_price: summary
                .regular_price
                .as_ref()
                .filter(|_| summary.on_sale)
                .map(|p| p.display()),
            sku: product.sku.clone(),
            image: None,
        },
        ProductKind::Grouped | ProductKind::External | ProductKind::Other => VariationStatus {
            message: "Not sold online".to_string(),
            price: summary.price.as_ref().map(|p| p.display()),
            ..VariationStatus::default()
        },
    }
}

/// A select box for one variation attribute.
#[derive(Clone)]
pub struct AttributeSelect {
    /// Form field name (`attribute_<name>`).
    pub field: String,
    pub label: String,
    pub options: Vec<AttributeOption>,
}

#[derive(Clone)]
pub struct AttributeOption {
    pub value: String,
    pub selected: bool,
}

fn attribute_selects(product: &Product, selected: &SelectedAttributes) -> Vec<AttributeSelect> {
    product
        .variation_attributes()
        .map(|attribute| {
            let current = selected.get(&attribute.name);
            AttributeSelect {
                field: format!("attribute_{}", attribute.name),
                label: attribute.label.clone(),
                options: attribute
                    .options
                    .iter()
                    .map(|value| AttributeOption {
                        value: value.clone(),
                        selected: current.is_some_and(|c| c.eq_ignore_ascii_case(value)),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/product.html")]
pub struct ProductTemplate {
    pub chrome: Chrome,
    pub product: Product,
    pub selects: Vec<AttributeSelect>,
    pub status: VariationStatus,
}

/// Variation status fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/variation_status.html")]
pub struct VariationStatusTemplate {
    pub status: VariationStatus,
}

/// Display a product.
///
/// Attribute selections in the query string (`?attribute_pa_color=red`)
/// preselect options, so variation links can be shared.
#[instrument(skip(state, chrome, query), fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    chrome: Chrome,
    Path(slug): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<ProductTemplate> {
    let product = state.woo().get_product_by_slug(&slug).await?;
    let selected = SelectedAttributes::from_form(&query);

    // Nothing chosen yet: show the prompt, not an error
    let status = if selected.is_empty() && product.summary.kind == ProductKind::Variable {
        VariationStatus {
            message: "Choose options to see price and availability".to_string(),
            ..VariationStatus::default()
        }
    } else {
        variation_status(&product, &selected)
    };

    Ok(ProductTemplate {
        chrome,
        selects: attribute_selects(&product, &selected),
        status,
        product,
    })
}

/// Variation status fragment (HTMX, on attribute change).
#[instrument(skip(state, query), fields(slug = %slug))]
pub async fn variation(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<VariationStatusTemplate> {
    let product = state.woo().get_product_by_slug(&slug).await?;
    let selected = SelectedAttributes::from_form(&query);
    Ok(VariationStatusTemplate {
        status: variation_status(&product, &selected),
    })
}
