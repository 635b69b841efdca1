//! Order Reconciler
//!
//! 对话期间购物车是真相来源；Draft 订单是它的持久化副本。
//!
//! - `load_into_session` - Draft → 购物车（会话开始时重建）
//! - `flush_to_draft` - 购物车 → Draft（每次变更后，幂等）
//! - `promote_to_order` - Draft 原地转为 Pending（无 Draft 时直接建单）
//! - `cancel_draft` - Draft 标记为 Cancelled
//!
//! Draft 可能被后台清理任务随时删除，读不到时一律按"没有 Draft"处理。

use serde::{Deserialize, Serialize};
use shared::models::{
    CartLine, DeliveryDetails, NewOrderItem, Order, OrderItem, OrderStatus, UserProfile,
};
use std::collections::{HashMap, HashSet};

use super::error::ChatError;
use super::merge::{line_key, merge_line, normalize};
use super::session::SessionKey;
use super::traits::ChatServices;
use crate::db::StoreError;
use crate::pricing::{self, DeliveryZones, Quote, UNSET_ADDRESS};

/// Writes performed by one flush
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    pub created_draft: bool,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub draft_deleted: bool,
}

impl FlushReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedOrder {
    pub order_id: i64,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total: f64,
    /// `false` when the order was built straight from the cart
    pub from_draft: bool,
}

/// Delivery fields as given by the customer
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitRequest<'r> {
    pub address: Option<&'r str>,
    pub customer_name: Option<&'r str>,
    pub phone_number: Option<&'r str>,
}

pub struct OrderReconciler<'a> {
    services: &'a ChatServices,
    now: i64,
}

fn new_items(cart: &[CartLine]) -> Vec<NewOrderItem> {
    cart.iter()
        .filter(|line| line.menu_item_id > 0 && line.quantity > 0)
        .map(|line| NewOrderItem {
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
            notes: normalize(&line.notes),
        })
        .collect()
}

impl<'a> OrderReconciler<'a> {
    pub fn new(services: &'a ChatServices, now: i64) -> Self {
        Self { services, now }
    }

    /// Profile for a persisted cart; anonymous / unknown users have none
    async fn persistent_user(&self, key: &SessionKey) -> Result<Option<UserProfile>, ChatError> {
        let Some(external_id) = key.user_id.as_deref() else {
            return Ok(None);
        };
        let user = self.services.users.resolve(external_id).await?;
        if user.is_none() {
            tracing::debug!(user_id = external_id, "Unknown user, cart stays in memory only");
        }
        Ok(user)
    }

    /// Rebuild the session cart from the user's Draft; returns lines loaded
    pub async fn load_into_session(&self, key: &SessionKey) -> Result<usize, ChatError> {
        let Some(user) = self.persistent_user(key).await? else {
            return Ok(0);
        };
        let Some(draft) = self.services.orders.find_draft(user.id).await? else {
            return Ok(0);
        };

        let items = match self.services.orders.list_items(draft.id).await {
            Ok(items) => items,
            Err(StoreError::NotFound(_)) => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut cart = Vec::with_capacity(items.len());
        for item in items {
            match self.services.catalog.find_by_id(item.menu_item_id).await? {
                Some(menu) => {
                    let line = CartLine {
                        menu_item_id: menu.id,
                        name: menu.name,
                        size: None,
                        notes: item.notes,
                        quantity: item.quantity,
                        unit_price: menu.price,
                    };
                    if let Err(e) = merge_line(&mut cart, line) {
                        tracing::warn!(
                            order_id = draft.id,
                            menu_item_id = item.menu_item_id,
                            error = %e,
                            "Duplicate draft line skipped"
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        order_id = draft.id,
                        menu_item_id = item.menu_item_id,
                        "Draft line references a removed menu item, skipped"
                    );
                }
            }
        }

        let loaded = cart.len();
        self.services.sessions.save(key, cart);
        tracing::info!(order_id = draft.id, lines = loaded, "Session rehydrated from draft");
        Ok(loaded)
    }

    /// Persist the session cart into the user's Draft
    pub async fn flush_to_draft(&self, key: &SessionKey) -> Result<FlushReport, ChatError> {
        let Some(user) = self.persistent_user(key).await? else {
            return Ok(FlushReport::default());
        };
        let cart = self.services.sessions.get(key);
        let report = self.flush_lines(user.id, &cart).await?;
        if !report.is_noop() {
            tracing::debug!(?report, "Cart flushed to draft");
        }
        Ok(report)
    }

    async fn flush_lines(&self, user_id: i64, cart: &[CartLine]) -> Result<FlushReport, ChatError> {
        let orders = &self.services.orders;
        let mut report = FlushReport::default();

        // 空购物车不持久化
        if cart.is_empty() {
            if let Some(draft) = orders.find_draft(user_id).await? {
                report.draft_deleted = orders.delete_order(draft.id).await?;
            }
            return Ok(report);
        }

        let draft = match orders.find_draft(user_id).await? {
            Some(draft) => draft,
            None => match orders.create_draft(user_id, self.now).await {
                Ok(draft) => {
                    report.created_draft = true;
                    draft
                }
                Err(e) => {
                    // 同一用户的另一个会话抢先建了 Draft：合并进去
                    let Some(draft) = orders.find_draft(user_id).await? else {
                        return Err(e.into());
                    };
                    tracing::debug!(
                        order_id = draft.id,
                        "Draft created concurrently, merging into it"
                    );
                    draft
                }
            },
        };

        match self.merge_into(draft.id, cart, &mut report).await {
            Err(ChatError::Store(StoreError::NotFound(_))) => {
                // Draft 在合并途中被删除：重建一次
                tracing::warn!(order_id = draft.id, "Draft vanished during flush, recreating");
                let draft = orders.create_draft(user_id, self.now).await?;
                report = FlushReport {
                    created_draft: true,
                    ..FlushReport::default()
                };
                self.merge_into(draft.id, cart, &mut report).await?;
            }
            other => other?,
        }
        Ok(report)
    }

    /// Merge pass keyed on `line_key`; cart wins
    async fn merge_into(
        &self,
        order_id: i64,
        cart: &[CartLine],
        report: &mut FlushReport,
    ) -> Result<(), ChatError> {
        let orders = &self.services.orders;
        let persisted = orders.list_items(order_id).await?;

        let mut by_key: HashMap<(i64, String), &OrderItem> = HashMap::new();
        for item in &persisted {
            by_key
                .entry(line_key(item.menu_item_id, &item.notes))
                .or_insert(item);
        }

        let mut kept: HashSet<i64> = HashSet::new();
        let mut seen: HashSet<(i64, String)> = HashSet::new();
        for line in cart {
            if line.menu_item_id <= 0 || line.quantity <= 0 {
                continue;
            }
            let key = line_key(line.menu_item_id, &line.notes);
            if !seen.insert(key.clone()) {
                continue;
            }
            match by_key.get(&key) {
                Some(existing) => {
                    kept.insert(existing.id);
                    if existing.quantity != line.quantity || existing.notes != key.1 {
                        orders.update_item(existing.id, line.quantity, &key.1).await?;
                        report.updated += 1;
                    }
                }
                None => {
                    let item = NewOrderItem {
                        menu_item_id: line.menu_item_id,
                        quantity: line.quantity,
                        notes: key.1.clone(),
                    };
                    let created = orders.insert_item(order_id, &item).await?;
                    kept.insert(created.id);
                    report.inserted += 1;
                }
            }
        }

        // 购物车里已不存在的持久化行 → 删除（含同 key 的重复行）
        let stale: Vec<i64> = persisted
            .iter()
            .map(|i| i.id)
            .filter(|id| !kept.contains(id))
            .collect();
        for item_id in stale {
            if orders.delete_item(item_id).await? {
                report.deleted += 1;
            }
        }
        Ok(())
    }

    /// Submit the session cart as a Pending order
    pub async fn promote_to_order(
        &self,
        key: &SessionKey,
        request: SubmitRequest<'_>,
    ) -> Result<SubmittedOrder, ChatError> {
        let cart = self.services.sessions.get(key);
        if cart.is_empty() {
            return Err(ChatError::EmptyOrder);
        }

        let user = self
            .persistent_user(key)
            .await?
            .ok_or_else(|| ChatError::UserNotFound(key.user_label().to_string()))?;

        let address = request
            .address
            .map(str::trim)
            .filter(|a| !DeliveryZones::is_unset(a))
            .ok_or_else(|| ChatError::UnsupportedDeliveryZone(UNSET_ADDRESS.to_string()))?;
        let delivery_fee = self.services.zones.delivery_fee(address)?;
        let subtotal = pricing::subtotal(&cart, self.services.catalog.as_ref()).await?;
        let quote = Quote::new(subtotal, delivery_fee);

        let delivery = DeliveryDetails {
            address: address.to_string(),
            customer_name: request
                .customer_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| user.name.clone()),
            phone_number: request
                .phone_number
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .or_else(|| user.phone.clone()),
        };

        let (order, from_draft) = match self.promote_existing(user.id, &cart, &delivery).await? {
            Some(order) => (order, true),
            None => {
                let order = self
                    .services
                    .orders
                    .create_order(user.id, &delivery, &new_items(&cart), self.now)
                    .await?;
                (order, false)
            }
        };

        tracing::info!(
            order_id = order.id,
            subtotal = quote.subtotal,
            delivery_fee = quote.delivery_fee,
            total = quote.total,
            from_draft,
            "Order submitted"
        );

        Ok(SubmittedOrder {
            order_id: order.id,
            subtotal: quote.subtotal,
            delivery_fee: quote.delivery_fee,
            total: quote.total,
            from_draft,
        })
    }

    /// Sync and promote the Draft in place; `None` if there is no Draft to promote
    async fn promote_existing(
        &self,
        user_id: i64,
        cart: &[CartLine],
        delivery: &DeliveryDetails,
    ) -> Result<Option<Order>, ChatError> {
        let orders = &self.services.orders;
        let Some(draft) = orders.find_draft(user_id).await? else {
            return Ok(None);
        };

        let mut report = FlushReport::default();
        match self.merge_into(draft.id, cart, &mut report).await {
            Err(ChatError::Store(StoreError::NotFound(_))) => return Ok(None),
            other => other?,
        }

        match orders.promote_draft(draft.id, delivery, self.now).await {
            Ok(order) => Ok(Some(order)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Mark the user's Draft cancelled; returns its id
    pub async fn cancel_draft(&self, user_id: i64) -> Result<Option<i64>, ChatError> {
        let orders = &self.services.orders;
        let Some(draft) = orders.find_draft(user_id).await? else {
            return Ok(None);
        };
        if !draft.status.can_transition_to(OrderStatus::Cancelled) {
            return Ok(None);
        }
        match orders
            .set_status(draft.id, OrderStatus::Cancelled, self.now)
            .await
        {
            Ok(()) => Ok(Some(draft.id)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
