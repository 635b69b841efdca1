//! Order history projection
//!
//! 历史订单不存价格：每次读取都按当前菜单价重新计算小计，
//! 配送费走同一张配送区域表。区域已失效的旧地址费用记为 `None`。

use serde::{Deserialize, Serialize};
use shared::models::{MenuItem, OrderStatus, OrderWithItems};
use std::collections::HashMap;

use crate::chat::ChatServices;
use crate::db::{CatalogProvider, StoreResult};
use crate::pricing::calculator::{line_total, priced_total};
use crate::pricing::{DeliveryZones, Quote};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummaryLine {
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i32,
    pub notes: String,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub status: OrderStatus,
    pub created_at: i64,
    pub delivery_address: Option<String>,
    pub lines: Vec<OrderSummaryLine>,
    pub subtotal: f64,
    pub delivery_fee: Option<f64>,
    pub total: Option<f64>,
}

impl OrderSummary {
    /// One-line description for chat replies
    pub fn headline(&self) -> String {
        let items = self
            .lines
            .iter()
            .map(|l| format!("{} x {}", l.quantity, l.name))
            .collect::<Vec<_>>()
            .join(", ");
        let amount = match self.total {
            Some(total) => format!("total {total:.2}"),
            None => format!("subtotal {:.2}", self.subtotal),
        };
        format!("#{} {}: {items}, {amount}", self.order_id, self.status)
    }
}

async fn catalog_snapshot(
    orders: &[OrderWithItems],
    catalog: &dyn CatalogProvider,
) -> StoreResult<HashMap<i64, MenuItem>> {
    let ids: Vec<i64> = orders
        .iter()
        .flat_map(|o| o.items.iter().map(|i| i.menu_item_id))
        .collect();
    let mut items = HashMap::new();
    for id in ids {
        if items.contains_key(&id) {
            continue;
        }
        if let Some(item) = catalog.find_by_id(id).await? {
            items.insert(id, item);
        }
    }
    Ok(items)
}

/// Price orders against the current catalog and zone table
pub async fn summarize(
    orders: Vec<OrderWithItems>,
    catalog: &dyn CatalogProvider,
    zones: &DeliveryZones,
) -> StoreResult<Vec<OrderSummary>> {
    let menu = catalog_snapshot(&orders, catalog).await?;
    let prices: HashMap<i64, f64> = menu.iter().map(|(id, m)| (*id, m.price)).collect();

    let summaries = orders
        .into_iter()
        .map(|OrderWithItems { order, items }| {
            let lines: Vec<OrderSummaryLine> = items
                .iter()
                .map(|item| {
                    let (name, unit_price) = match menu.get(&item.menu_item_id) {
                        Some(m) => (m.name.clone(), m.price),
                        None => (format!("Unavailable item #{}", item.menu_item_id), 0.0),
                    };
                    OrderSummaryLine {
                        menu_item_id: item.menu_item_id,
                        name,
                        quantity: item.quantity,
                        notes: item.notes.clone(),
                        unit_price,
                        line_total: line_total(unit_price, item.quantity),
                    }
                })
                .collect();
            let subtotal = priced_total(
                items.iter().map(|i| (i.menu_item_id, i.quantity)),
                &prices,
            );

            let address = order.delivery_address.as_deref().unwrap_or_default();
            let delivery_fee = match zones.delivery_fee(address) {
                Ok(fee) => Some(fee),
                Err(e) => {
                    tracing::warn!(order_id = order.id, error = %e, "History order address no longer priced");
                    None
                }
            };
            let total = delivery_fee.map(|fee| Quote::new(subtotal, fee).total);

            OrderSummary {
                order_id: order.id,
                status: order.status,
                created_at: order.created_at,
                delivery_address: order.delivery_address,
                lines,
                subtotal,
                delivery_fee,
                total,
            }
        })
        .collect();
    Ok(summaries)
}

/// Most recent non-draft orders of a user, priced
pub async fn recent_summaries(
    services: &ChatServices,
    user_id: i64,
    limit: u32,
) -> StoreResult<Vec<OrderSummary>> {
    let orders = services.orders.recent_orders(user_id, limit).await?;
    summarize(orders, services.catalog.as_ref(), &services.zones).await
}
