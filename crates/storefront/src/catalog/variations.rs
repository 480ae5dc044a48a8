//! Resolve a variable product's attribute selection to a variation.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::woo::{Variation, VariationAttribute};

/// Why a selection does not resolve to a variation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariationMatchError {
    /// Some attributes have no chosen value.
    #[error("Please choose: {}", .0.join(", "))]
    IncompleteSelection(Vec<String>),
    /// Every attribute is chosen but no variation has that combination.
    #[error("This combination is unavailable. Please choose another.")]
    NoMatch,
}

/// The shopper's chosen attribute values, keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedAttributes(BTreeMap<String, String>);

impl SelectedAttributes {
    /// Read `attribute_<name>` fields from a submitted form.
    #[must_use]
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        Self::from_pairs(
            form.iter()
                .filter(|(key, _)| key.starts_with("attribute_"))
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
    }

    /// Build from `(name, value)` pairs; blank values are skipped.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .map(|(name, value)| (normalize_name(name), value.trim().to_string()))
                .collect(),
        )
    }

    /// Chosen value for an attribute (any spelling of its name).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&normalize_name(name)).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `attribute_pa_Color`, `pa_color` and `Color` all name the same attribute.
fn normalize_name(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("attribute_").unwrap_or(name);
    let name = name.strip_prefix("pa_").unwrap_or(name);
    name.to_lowercase()
}

fn values_match(variation_value: &str, selected: &str) -> bool {
    variation_value.is_empty()
        || variation_value.trim().to_lowercase() == selected.trim().to_lowercase()
}

/// Find the variation matching the selection.
///
/// Linear scan in API order. Every attribute that any variation is keyed on
/// must be chosen; a variation attribute with an empty value matches any
/// choice.
///
/// # Errors
///
/// [`VariationMatchError::IncompleteSelection`] lists unchosen attributes;
/// [`VariationMatchError::NoMatch`] means the combination does not exist.
pub fn match_variation<'a>(
    variations: &'a [Variation],
    selected: &SelectedAttributes,
) -> Result<&'a Variation, VariationMatchError> {
    let mut missing: Vec<String> = Vec::new();
    for attribute in variations.iter().flat_map(|v| &v.attributes) {
        if selected.get(&attribute.name).is_none() {
            let label = display_name(&attribute.name);
            if !missing.contains(&label) {
                missing.push(label);
            }
        }
    }
    if !missing.is_empty() {
        return Err(VariationMatchError::IncompleteSelection(missing));
    }

    variations
        .iter()
        .find(|variation| {
            variation.attributes.iter().all(|attribute| {
                selected
                    .get(&attribute.name)
                    .is_some_and(|value| values_match(&attribute.value, value))
            })
        })
        .ok_or(VariationMatchError::NoMatch)
}

/// The variation's attributes with "any" values filled in from the selection.
///
/// WooCommerce needs the concrete value for "any" attributes when adding to
/// the cart.
#[must_use]
pub fn resolved_attributes(
    variation: &Variation,
    selected: &SelectedAttributes,
) -> Vec<VariationAttribute> {
    variation
        .attributes
        .iter()
        .map(|attribute| VariationAttribute {
            name: attribute.name.clone(),
            value: if attribute.value.is_empty() {
                selected.get(&attribute.name).unwrap_or_default().to_string()
            } else {
                attribute.value.clone()
            },
        })
        .collect()
}

fn display_name(name: &str) -> String {
    let bare = normalize_name(name).replace(['-', '_'], " ");
    let mut chars = bare.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use woo_headless_core::{StockStatus, VariationId};

    fn variation(id: i32, attrs: &[(&str, &str)]) -> Variation {
        Variation {
            id: VariationId::new(id),
            name: format!("v{id}"),
            sku: None,
            price: None,
            regular_price: None,
            sale_price: None,
            stock_status: StockStatus::InStock,
            stock_quantity: None,
            image: None,
            attributes: attrs
                .iter()
                .map(|(name, value)| VariationAttribute {
                    name: (*name).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        }
    }

    fn catalog() -> Vec<Variation> {
        vec![
            variation(1, &[("pa_color", "red"), ("pa_size", "m")]),
            variation(2, &[("pa_color", "blue"), ("pa_size", "m")]),
            variation(3, &[("pa_color", "blue"), ("pa_size", "")]),
        ]
    }

    #[test]
    fn test_match_is_case_insensitive_and_prefix_agnostic() {
        let variations = catalog();
        let selected =
            SelectedAttributes::from_pairs([("attribute_pa_color", "RED"), ("Size", "M")]);
        assert_eq!(
            match_variation(&variations, &selected).unwrap().id,
            VariationId::new(1)
        );
    }

    #[test]
    fn test_any_value_matches() {
        let variations = catalog();
        let selected = SelectedAttributes::from_pairs([("pa_color", "blue"), ("pa_size", "xl")]);
        let found = match_variation(&variations, &selected).unwrap();
        assert_eq!(found.id, VariationId::new(3));

        let resolved = resolved_attributes(found, &selected);
        assert_eq!(resolved[1].value, "xl");
        assert_eq!(resolved[0].value, "blue");
    }

    #[test]
    fn test_first_match_wins() {
        let variations = catalog();
        let selected = SelectedAttributes::from_pairs([("pa_color", "blue"), ("pa_size", "m")]);
        assert_eq!(
            match_variation(&variations, &selected).unwrap().id,
            VariationId::new(2)
        );
    }

    #[test]
    fn test_incomplete_selection_lists_missing() {
        let variations = catalog();
        let selected = SelectedAttributes::from_pairs([("pa_color", "red"), ("pa_size", " ")]);
        assert_eq!(
            match_variation(&variations, &selected).map(|v| v.id),
            Err(VariationMatchError::IncompleteSelection(vec!["Size".to_string()]))
        );
    }

    #[test]
    fn test_no_match() {
        let variations = catalog();
        let selected = SelectedAttributes::from_pairs([("pa_color", "green"), ("pa_size", "m")]);
        assert_eq!(
            match_variation(&variations, &selected).map(|v| v.id),
            Err(VariationMatchError::NoMatch)
        );
    }

    #[test]
    fn test_match_folds_non_ascii_case() {
        let variations = vec![variation(7, &[("pa_färg", "Blå")])];
        let selected = SelectedAttributes::from_pairs([("pa_färg", "BLÅ")]);
        assert_eq!(
            match_variation(&variations, &selected).map(|v| v.id),
            Ok(VariationId::new(7))
        );
    }

    #[test]
    fn test_from_form_reads_only_attribute_fields() {
        let mut form = HashMap::new();
        form.insert("attribute_pa_color".to_string(), "red".to_string());
        form.insert("quantity".to_string(), "2".to_string());
        let selected = SelectedAttributes::from_form(&form);
        assert_eq!(selected.get("color"), Some("red"));
        assert_eq!(selected.get("quantity"), None);
    }
}
