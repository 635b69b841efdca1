//! Conversation session store
//!
//! Key = (conversationId, userId)，值为有序的购物车行。
//! `Display` 形式 `conversationId_userId` 只用于日志。
//! 条目不会自动过期，只在提交 / 取消 / 会话结束时清除。

use dashmap::DashMap;
use shared::models::CartLine;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Session identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub conversation_id: String,
    pub user_id: Option<String>,
}

impl SessionKey {
    pub fn new(conversation_id: impl Into<String>, user_id: Option<&str>) -> Self {
        Self {
            conversation_id: conversation_id.into().trim().to_string(),
            user_id: user_id
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        }
    }

    /// External user id or `"unknown"`
    pub fn user_label(&self) -> &str {
        self.user_id.as_deref().unwrap_or("unknown")
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.conversation_id, self.user_label())
    }
}

/// Keyed cart storage
///
/// 单节点用 [`InMemorySessionStore`]；多节点可换成外部缓存实现。
pub trait SessionStore: Send + Sync {
    /// Cart lines, empty if absent
    fn get(&self, key: &SessionKey) -> Vec<CartLine>;

    /// Replace the cart; an empty cart removes the key
    fn save(&self, key: &SessionKey, lines: Vec<CartLine>);

    fn clear(&self, key: &SessionKey);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// DashMap-backed store (sharded, distinct keys never contend)
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    carts: DashMap<SessionKey, Vec<CartLine>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &SessionKey) -> Vec<CartLine> {
        self.carts
            .get(key)
            .map(|lines| lines.value().clone())
            .unwrap_or_default()
    }

    fn save(&self, key: &SessionKey, lines: Vec<CartLine>) {
        if lines.is_empty() {
            self.carts.remove(key);
        } else {
            self.carts.insert(key.clone(), lines);
        }
    }

    fn clear(&self, key: &SessionKey) {
        self.carts.remove(key);
    }

    fn len(&self) -> usize {
        self.carts.len()
    }
}

/// Per-session turn locks
///
/// 同一会话的并发 turn 串行执行；不同会话互不阻塞。
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: DashMap<SessionKey, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one session
    pub async fn acquire(&self, key: &SessionKey) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(key.clone()).or_default().clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry if nobody holds or waits on it
    pub fn forget(&self, key: &SessionKey) {
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
