//! In-memory store
//!
//! 实现全部协作者 trait，数据放在一把 `parking_lot::RwLock` 后面。
//! 用于单元测试和 `STORAGE=memory` 模式（进程退出即丢失）。

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use parking_lot::RwLock;
use shared::models::{
    DeliveryDetails, MenuItem, NewOrderItem, NewReservation, Order, OrderItem, OrderStatus,
    OrderWithItems, Reservation, UserProfile,
};
use shared::util::now_millis;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use super::store::{
    CatalogProvider, OrderStore, ReservationStore, SlotOutcome, StoreError, StoreResult,
    UserDirectory,
};

#[derive(Default)]
struct Tables {
    menu: BTreeMap<i64, MenuItem>,
    users: BTreeMap<i64, UserProfile>,
    orders: BTreeMap<i64, Order>,
    items: BTreeMap<i64, OrderItem>,
    reservations: BTreeMap<i64, Reservation>,
}

/// All collaborator tables in one process-local structure
pub struct MemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicI64,
    /// Mutating calls on orders/items, used to assert write-free flushes
    writes: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_id: AtomicI64::new(1),
            writes: AtomicU64::new(0),
        }
    }

    /// Store pre-filled with the starter catalog and the `demo` customer
    pub fn seeded() -> Self {
        let store = Self::new();
        store.add_menu_item("Pizza", 10.0, "Tomato sauce, mozzarella, basil");
        store.add_menu_item("Tea", 5.0, "Black tea with fresh mint");
        store.add_menu_item("Chicken Kebab", 18.0, "Grilled chicken, onions, garlic sauce");
        store.add_menu_item("Beef Kebab", 22.0, "Minced beef, parsley, onions, tahini");
        store.add_menu_item("Falafel Wrap", 8.0, "Chickpeas, tahini, pickles, tomato");
        store.add_menu_item("Musakhan", 35.0, "Roasted chicken, sumac, onions, taboon bread");
        store.add_user("demo", "Demo Customer", Some("0590000000"));
        store
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn touch(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    // ========== Seeding / inspection ==========

    pub fn add_menu_item(&self, name: &str, price: f64, description: &str) -> MenuItem {
        let item = MenuItem {
            id: self.next_id(),
            name: name.to_string(),
            price,
            description: description.to_string(),
            is_available: true,
        };
        self.tables.write().menu.insert(item.id, item.clone());
        item
    }

    pub fn set_price(&self, menu_item_id: i64, price: f64) {
        if let Some(item) = self.tables.write().menu.get_mut(&menu_item_id) {
            item.price = price;
        }
    }

    pub fn set_available(&self, menu_item_id: i64, available: bool) {
        if let Some(item) = self.tables.write().menu.get_mut(&menu_item_id) {
            item.is_available = available;
        }
    }

    pub fn remove_menu_item(&self, menu_item_id: i64) {
        self.tables.write().menu.remove(&menu_item_id);
    }

    pub fn add_user(&self, external_id: &str, name: &str, phone: Option<&str>) -> UserProfile {
        let user = UserProfile {
            id: self.next_id(),
            external_id: external_id.to_string(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
        };
        self.tables.write().users.insert(user.id, user.clone());
        user
    }

    pub fn order(&self, order_id: i64) -> Option<Order> {
        self.tables.read().orders.get(&order_id).cloned()
    }

    pub fn orders_for(&self, user_id: i64) -> Vec<Order> {
        self.tables
            .read()
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn reservation_count(&self) -> usize {
        self.tables.read().reservations.len()
    }

    /// Number of order/item writes so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn items_of(tables: &Tables, order_id: i64) -> Vec<OrderItem> {
        tables
            .items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    fn insert_order(
        &self,
        tables: &mut Tables,
        user_id: i64,
        status: OrderStatus,
        delivery: Option<&DeliveryDetails>,
        now: i64,
    ) -> Order {
        let order = Order {
            id: self.next_id(),
            user_id,
            status,
            delivery_address: delivery.map(|d| d.address.clone()),
            customer_name: delivery.map(|d| d.customer_name.clone()),
            phone_number: delivery.and_then(|d| d.phone_number.clone()),
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(order.id, order.clone());
        order
    }
}

#[async_trait]
impl CatalogProvider for MemoryStore {
    async fn list_available(&self) -> StoreResult<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self
            .tables
            .read()
            .menu
            .values()
            .filter(|m| m.is_available)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<MenuItem>> {
        Ok(self.tables.read().menu.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<MenuItem>> {
        Ok(self
            .tables
            .read()
            .menu
            .values()
            .find(|m| same_name(&m.name, name))
            .cloned())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn resolve(&self, external_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.external_id == external_id)
            .cloned())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_draft(&self, user_id: i64) -> StoreResult<Option<Order>> {
        Ok(self
            .tables
            .read()
            .orders
            .values()
            .find(|o| o.user_id == user_id && o.status == OrderStatus::Draft)
            .cloned())
    }

    async fn create_draft(&self, user_id: i64, now: i64) -> StoreResult<Order> {
        let mut tables = self.tables.write();
        if tables
            .orders
            .values()
            .any(|o| o.user_id == user_id && o.status == OrderStatus::Draft)
        {
            return Err(StoreError::Database(format!(
                "user {user_id} already has a draft order"
            )));
        }
        self.touch();
        Ok(self.insert_order(&mut tables, user_id, OrderStatus::Draft, None, now))
    }

    async fn list_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>> {
        Ok(Self::items_of(&self.tables.read(), order_id))
    }

    async fn insert_item(&self, order_id: i64, item: &NewOrderItem) -> StoreResult<OrderItem> {
        let mut tables = self.tables.write();
        match tables.orders.get_mut(&order_id) {
            Some(o) if o.status == OrderStatus::Draft => o.updated_at = now_millis(),
            _ => return Err(StoreError::NotFound(format!("Draft order {order_id}"))),
        }
        self.touch();
        let row = OrderItem {
            id: self.next_id(),
            order_id,
            menu_item_id: item.menu_item_id,
            quantity: item.quantity,
            notes: item.notes.clone(),
        };
        tables.items.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_item(&self, item_id: i64, quantity: i32, notes: &str) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let row = tables
            .items
            .get_mut(&item_id)
            .ok_or_else(|| StoreError::NotFound(format!("Order item {item_id}")))?;
        row.quantity = quantity;
        row.notes = notes.to_string();
        let order_id = row.order_id;
        if let Some(order) = tables.orders.get_mut(&order_id) {
            order.updated_at = now_millis();
        }
        self.touch();
        Ok(())
    }

    async fn delete_item(&self, item_id: i64) -> StoreResult<bool> {
        let removed = self.tables.write().items.remove(&item_id).is_some();
        if removed {
            self.touch();
        }
        Ok(removed)
    }

    async fn delete_order(&self, order_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let removed = tables.orders.remove(&order_id).is_some();
        if removed {
            tables.items.retain(|_, i| i.order_id != order_id);
            self.touch();
        }
        Ok(removed)
    }

    async fn promote_draft(
        &self,
        order_id: i64,
        delivery: &DeliveryDetails,
        now: i64,
    ) -> StoreResult<Order> {
        let mut tables = self.tables.write();
        let order = tables
            .orders
            .get_mut(&order_id)
            .filter(|o| o.status == OrderStatus::Draft)
            .ok_or_else(|| StoreError::NotFound(format!("Draft order {order_id}")))?;
        order.status = OrderStatus::Pending;
        order.delivery_address = Some(delivery.address.clone());
        order.customer_name = Some(delivery.customer_name.clone());
        order.phone_number = delivery.phone_number.clone();
        // 提交时刻即订单创建时刻（取消窗口从这里起算）
        order.created_at = now;
        order.updated_at = now;
        let promoted = order.clone();
        self.touch();
        Ok(promoted)
    }

    async fn create_order(
        &self,
        user_id: i64,
        delivery: &DeliveryDetails,
        items: &[NewOrderItem],
        now: i64,
    ) -> StoreResult<Order> {
        let mut tables = self.tables.write();
        let order = self.insert_order(
            &mut tables,
            user_id,
            OrderStatus::Pending,
            Some(delivery),
            now,
        );
        for item in items {
            let row = OrderItem {
                id: self.next_id(),
                order_id: order.id,
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                notes: item.notes.clone(),
            };
            tables.items.insert(row.id, row);
        }
        self.touch();
        Ok(order)
    }

    async fn set_status(&self, order_id: i64, status: OrderStatus, now: i64) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let order = tables
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::NotFound(format!("Order {order_id}")))?;
        order.status = status;
        order.updated_at = now;
        self.touch();
        Ok(())
    }

    async fn find_pending_since(&self, user_id: i64, since: i64) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .tables
            .read()
            .orders
            .values()
            .filter(|o| {
                o.user_id == user_id && o.status == OrderStatus::Pending && o.created_at >= since
            })
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn recent_orders(&self, user_id: i64, limit: u32) -> StoreResult<Vec<OrderWithItems>> {
        let tables = self.tables.read();
        let mut orders: Vec<&Order> = tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id && o.status != OrderStatus::Draft)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders
            .into_iter()
            .take(limit as usize)
            .map(|o| OrderWithItems {
                order: o.clone(),
                items: Self::items_of(&tables, o.id),
            })
            .collect())
    }

    async fn delete_stale_drafts(&self, before: i64) -> StoreResult<u64> {
        let mut tables = self.tables.write();
        let stale: Vec<i64> = tables
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Draft && o.updated_at < before)
            .map(|o| o.id)
            .collect();
        for id in &stale {
            tables.orders.remove(id);
        }
        tables.items.retain(|_, i| !stale.contains(&i.order_id));
        if !stale.is_empty() {
            self.touch();
        }
        Ok(stale.len() as u64)
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn count_at(&self, date: NaiveDate, time: NaiveTime) -> StoreResult<i64> {
        Ok(self
            .tables
            .read()
            .reservations
            .values()
            .filter(|r| r.date == date && r.time == time)
            .count() as i64)
    }

    async fn find_by_slot(
        &self,
        customer_name: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> StoreResult<Option<Reservation>> {
        Ok(self
            .tables
            .read()
            .reservations
            .values()
            .find(|r| r.date == date && r.time == time && same_name(&r.customer_name, customer_name))
            .cloned())
    }

    async fn insert_if_available(
        &self,
        reservation: &NewReservation,
        capacity: i64,
    ) -> StoreResult<SlotOutcome> {
        // 一把写锁覆盖 count → duplicate → insert
        let mut tables = self.tables.write();
        let in_slot: Vec<&Reservation> = tables
            .reservations
            .values()
            .filter(|r| r.date == reservation.date && r.time == reservation.time)
            .collect();

        if in_slot.len() as i64 >= capacity {
            return Ok(SlotOutcome::SlotFull);
        }
        if in_slot
            .iter()
            .any(|r| same_name(&r.customer_name, &reservation.customer_name))
        {
            return Ok(SlotOutcome::Duplicate);
        }

        let created = Reservation {
            id: self.next_id(),
            user_id: reservation.user_id,
            customer_name: reservation.customer_name.trim().to_string(),
            date: reservation.date,
            time: reservation.time,
            party_size: reservation.party_size,
            created_at: reservation.created_at,
        };
        tables.reservations.insert(created.id, created.clone());
        Ok(SlotOutcome::Created(created))
    }

    async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<Reservation>> {
        let mut list: Vec<Reservation> = self
            .tables
            .read()
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(list)
    }
}
