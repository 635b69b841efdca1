//! Price Calculator
//!
//! Subtotals are always priced from the live catalog, never from the
//! `unit_price` snapshot on a cart line.
//! Uses rust_decimal for precise calculations, exposes f64.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::{CatalogProvider, StoreResult};
use shared::models::CartLine;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// unit_price × quantity
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Sum `(menu_item_id, quantity)` pairs against a price table
///
/// Ids missing from `prices` contribute 0.
pub fn priced_total(
    entries: impl IntoIterator<Item = (i64, i32)>,
    prices: &HashMap<i64, f64>,
) -> f64 {
    let total: Decimal = entries
        .into_iter()
        .map(|(id, quantity)| match prices.get(&id) {
            Some(price) => to_decimal(*price) * Decimal::from(quantity),
            None => Decimal::ZERO,
        })
        .sum();
    to_f64(total)
}

/// a + b with money rounding
pub fn add(a: f64, b: f64) -> f64 {
    to_f64(to_decimal(a) + to_decimal(b))
}

/// Fetch current prices for the given menu item ids
///
/// Items that vanished from the catalog are logged and left out.
pub async fn current_prices(
    ids: &[i64],
    catalog: &dyn CatalogProvider,
) -> StoreResult<HashMap<i64, f64>> {
    let mut prices = HashMap::new();
    for &id in ids {
        if prices.contains_key(&id) {
            continue;
        }
        match catalog.find_by_id(id).await? {
            Some(item) => {
                prices.insert(id, item.price);
            }
            None => {
                tracing::warn!(menu_item_id = id, "Menu item no longer in catalog, priced at 0");
            }
        }
    }
    Ok(prices)
}

/// Σ quantity × current catalog price
pub async fn subtotal(lines: &[CartLine], catalog: &dyn CatalogProvider) -> StoreResult<f64> {
    let ids: Vec<i64> = lines.iter().map(|l| l.menu_item_id).collect();
    let prices = current_prices(&ids, catalog).await?;
    Ok(priced_total(
        lines.iter().map(|l| (l.menu_item_id, l.quantity)),
        &prices,
    ))
}

/// Subtotal, delivery fee and total for one order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total: f64,
}

impl Quote {
    pub fn new(subtotal: f64, delivery_fee: f64) -> Self {
        Self {
            subtotal,
            delivery_fee,
            total: add(subtotal, delivery_fee),
        }
    }
}
