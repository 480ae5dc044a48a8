//! Cart conversions.

use woo_headless_core::{CurrencyCode, ProductId, Quantity, VariationId};

use crate::woo::queries::cart::{CartFields, CartItem as RawCartItem};
use crate::woo::types::{AppliedCoupon, Cart, CartItem, CartTotals, ShippingRate};

use super::{convert_image, price_or_zero};

/// Convert the cart. A missing cart (fresh session) is an empty cart.
pub fn convert_cart(cart: Option<CartFields>, currency: CurrencyCode) -> Cart {
    let Some(cart) = cart else {
        return Cart::empty(currency);
    };

    let chosen: Vec<String> = cart
        .chosen_shipping_methods
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect();

    let shipping_rates = cart
        .available_shipping_methods
        .unwrap_or_default()
        .into_iter()
        .flat_map(|package| package.rates.unwrap_or_default())
        .map(|rate| ShippingRate {
            selected: chosen.contains(&rate.id),
            label: rate.label.unwrap_or_else(|| rate.id.clone()),
            cost: price_or_zero(rate.cost.as_deref(), currency),
            id: rate.id,
        })
        .collect();

    let coupons = cart
        .applied_coupons
        .unwrap_or_default()
        .into_iter()
        .map(|coupon| AppliedCoupon {
            amount: price_or_zero(coupon.discount_amount.as_deref(), currency),
            code: coupon.code,
        })
        .collect();

    let (nodes, reported_count) = cart
        .contents
        .map_or_else(|| (Vec::new(), None), |c| (c.nodes, c.item_count));
    let items: Vec<CartItem> = nodes
        .into_iter()
        .filter_map(|item| convert_cart_item(item, currency))
        .collect();

    let item_count = reported_count
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_else(|| items.iter().map(|item| item.quantity.get()).sum());

    Cart {
        items,
        item_count,
        totals: CartTotals {
            subtotal: price_or_zero(cart.subtotal.as_deref(), currency),
            discount: price_or_zero(cart.discount_total.as_deref(), currency),
            shipping: price_or_zero(cart.shipping_total.as_deref(), currency),
            tax: price_or_zero(cart.total_tax.as_deref(), currency),
            total: price_or_zero(cart.total.as_deref(), currency),
        },
        coupons,
        shipping_rates,
        needs_shipping_address: cart.needs_shipping_address,
    }
}

fn convert_cart_item(item: RawCartItem, currency: CurrencyCode) -> Option<CartItem> {
    // Lines whose product was deleted come back without a node; skip them.
    let product = item.product.and_then(|p| p.node)?;

    let (variation_id, variation_label, variation_image) = match item.variation {
        Some(variation) => {
            let label = variation
                .attributes
                .unwrap_or_default()
                .into_iter()
                .filter_map(|a| {
                    let value = a.value.filter(|v| !v.is_empty())?;
                    Some(format!("{}: {value}", a.name.unwrap_or_default()))
                })
                .collect::<Vec<_>>()
                .join(", ");
            let node = variation.node;
            (
                node.as_ref().map(|n| VariationId::new(n.database_id)),
                Some(label).filter(|l| !l.is_empty()),
                node.and_then(|n| convert_image(n.image)),
            )
        }
        None => (None, None, None),
    };

    Some(CartItem {
        key: item.key,
        product_id: ProductId::new(product.database_id),
        slug: product.slug.unwrap_or_default(),
        name: product.name.unwrap_or_default(),
        variation_id,
        variation_label,
        quantity: Quantity::clamped(i64::from(item.quantity.unwrap_or(1))),
        subtotal: price_or_zero(item.subtotal.as_deref(), currency),
        total: price_or_zero(item.total.as_deref(), currency),
        image: variation_image.or_else(|| convert_image(product.image)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cart_json() -> serde_json::Value {
        serde_json::json!({
            "isEmpty": false,
            "subtotal": "36.00",
            "discountTotal": "3.60",
            "shippingTotal": "5.00",
            "totalTax": "0.00",
            "total": "37.40",
            "needsShippingAddress": true,
            "chosenShippingMethods": ["flat_rate:1"],
            "appliedCoupons": [{ "code": "save10", "discountAmount": "3.60" }],
            "availableShippingMethods": [{ "rates": [
                { "id": "flat_rate:1", "label": "Flat rate", "cost": "5.00" },
                { "id": "local_pickup:2", "label": "Pickup", "cost": "0.00" }
            ]}],
            "contents": {
                "itemCount": 3,
                "nodes": [
                    {
                        "key": "abc",
                        "quantity": 2,
                        "subtotal": "24.00",
                        "total": "21.60",
                        "product": { "node": { "databaseId": 7, "slug": "tee", "name": "Tee" } },
                        "variation": {
                            "attributes": [{ "name": "Color", "value": "Red" }, { "name": "Size", "value": "M" }],
                            "node": { "databaseId": 8, "name": "Tee - Red, M",
                                      "image": { "sourceUrl": "https://cdn/red.jpg", "altText": "" } }
                        }
                    },
                    {
                        "key": "def",
                        "quantity": 1,
                        "subtotal": "12.00",
                        "total": "10.80",
                        "product": { "node": { "databaseId": 9, "slug": "cap", "name": "Cap" } },
                        "variation": null
                    },
                    { "key": "gone", "quantity": 1, "product": null }
                ]
            }
        })
    }

    #[test]
    fn test_convert_cart() {
        let raw: CartFields = serde_json::from_value(cart_json()).unwrap();
        let cart = convert_cart(Some(raw), CurrencyCode::USD);

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.totals.total.display(), "$37.40");
        assert_eq!(cart.coupons[0].code, "save10");
        assert_eq!(cart.selected_shipping_rate(), Some("flat_rate:1"));
        assert_eq!(cart.shipping_rates.len(), 2);

        let tee = cart.item("abc").unwrap();
        assert_eq!(tee.variation_id, Some(VariationId::new(8)));
        assert_eq!(tee.variation_label.as_deref(), Some("Color: Red, Size: M"));
        assert_eq!(tee.image.as_ref().unwrap().url, "https://cdn/red.jpg");
        assert_eq!(tee.unit_price().display(), "$12.00");

        let cap = cart.item("def").unwrap();
        assert!(cap.variation_id.is_none());
        assert!(cap.image.is_none());
    }

    #[test]
    fn test_missing_cart_is_empty() {
        let cart = convert_cart(None, CurrencyCode::GBP);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count, 0);
    }
}
