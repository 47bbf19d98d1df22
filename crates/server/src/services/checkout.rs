//! Checkout pricing: split a mixed cart into one priced order per store.
//!
//! Pure functions over cart lines, so the math is testable without a
//! database. Persistence happens in `OrderRepository::place_orders`.

use std::collections::BTreeMap;

use mercantia_core::StoreId;

use crate::db::orders::{NewOrder, NewOrderItem};
use crate::models::cart::CartItemDetail;

/// Sales tax, basis points of the subtotal.
pub const TAX_RATE_BASIS_POINTS: i64 = 1000;

/// Flat shipping per store order, in minor units.
pub const SHIPPING_FLAT_CENTS: i64 = 1000;

/// Problems found while pricing a cart.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A line asks for more units than the store has.
    #[error("not enough stock of {product_name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_name: String,
        requested: i32,
        available: i32,
    },
}

/// Price a cart into per-store order drafts.
///
/// Lines are grouped by store; each group gets a 10% tax on its subtotal
/// (rounded to the nearest minor unit) and a flat shipping charge. Prices
/// come from the product's current price, not the add-to-cart snapshot, so
/// the buyer pays what the listing shows at checkout time.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart and
/// `CheckoutError::InsufficientStock` when any line exceeds inventory. Stock
/// is re-checked inside the placement transaction; this early check exists
/// to fail before payment, not to prevent races.
pub fn price_cart(
    items: &[CartItemDetail],
    notes: Option<&str>,
) -> Result<Vec<NewOrder>, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    for item in items {
        if item.item.quantity > item.inventory {
            return Err(CheckoutError::InsufficientStock {
                product_name: item.product_name.clone(),
                requested: item.item.quantity,
                available: item.inventory,
            });
        }
    }

    // BTreeMap keeps store order deterministic.
    let mut by_store: BTreeMap<StoreId, Vec<&CartItemDetail>> = BTreeMap::new();
    for item in items {
        by_store.entry(item.store_id).or_default().push(item);
    }

    let orders = by_store
        .into_iter()
        .map(|(store_id, lines)| {
            let items: Vec<NewOrderItem> = lines
                .iter()
                .map(|line| {
                    let quantity = i64::from(line.item.quantity);
                    NewOrderItem {
                        product_id: line.item.product_id,
                        quantity: line.item.quantity,
                        price_per_unit: line.current_price,
                        total: line.current_price.saturating_mul(quantity),
                    }
                })
                .collect();

            let subtotal: i64 = items.iter().map(|i| i.total).sum();
            let tax = round_basis_points(subtotal, TAX_RATE_BASIS_POINTS);
            let shipping_cost = SHIPPING_FLAT_CENTS;
            let total = subtotal + tax + shipping_cost;

            NewOrder {
                store_id,
                subtotal,
                tax,
                shipping_cost,
                total,
                notes: notes.map(ToString::to_string),
                items,
            }
        })
        .collect();

    Ok(orders)
}

/// Apply a basis-point rate, rounding half away from zero.
fn round_basis_points(amount: i64, basis_points: i64) -> i64 {
    (amount * basis_points + 5_000) / 10_000
}
