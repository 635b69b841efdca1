//! Intent handler trait and execution context

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use shared::intent::RequestedItem;
use shared::models::{CartLine, MenuItem, UserProfile};
use std::sync::Arc;
use std::time::Duration;

use super::error::ChatError;
use super::policy::ChatPolicy;
use super::reconciler::OrderReconciler;
use super::session::{InMemorySessionStore, SessionKey, SessionStore};
use crate::db::{CatalogProvider, OrderStore, ReservationStore, UserDirectory};
use crate::pricing::{self, DeliveryZones};

/// Per-turn metadata
#[derive(Debug, Clone)]
pub struct IntentMetadata {
    pub conversation_id: String,
    pub user_id: Option<String>,
    pub turn_id: String,
    /// Unix millis
    pub now_millis: i64,
    /// Business-timezone date of `now_millis`
    pub today: NaiveDate,
}

/// Collaborators injected into the engine
#[derive(Clone)]
pub struct ChatServices {
    pub catalog: Arc<dyn CatalogProvider>,
    pub users: Arc<dyn UserDirectory>,
    pub orders: Arc<dyn OrderStore>,
    pub reservations: Arc<dyn ReservationStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub zones: Arc<DeliveryZones>,
    pub policy: ChatPolicy,
    /// Upper bound for one whole turn
    pub store_timeout: Duration,
}

impl ChatServices {
    /// Wire every collaborator trait to one store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CatalogProvider + UserDirectory + OrderStore + ReservationStore + 'static,
    {
        Self {
            catalog: store.clone(),
            users: store.clone(),
            orders: store.clone(),
            reservations: store,
            sessions: Arc::new(InMemorySessionStore::new()),
            zones: Arc::new(DeliveryZones::default()),
            policy: ChatPolicy::default(),
            store_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_zones(mut self, zones: DeliveryZones) -> Self {
        self.zones = Arc::new(zones);
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

/// Mutable state one handler works on
///
/// `cart` 是本 turn 的工作副本，处理器返回后由 dispatcher 决定是否写回。
pub struct IntentContext<'a> {
    pub key: SessionKey,
    pub cart: Vec<CartLine>,
    pub meta: &'a IntentMetadata,
    pub services: &'a ChatServices,
}

impl<'a> IntentContext<'a> {
    pub fn new(
        key: SessionKey,
        cart: Vec<CartLine>,
        meta: &'a IntentMetadata,
        services: &'a ChatServices,
    ) -> Self {
        Self {
            key,
            cart,
            meta,
            services,
        }
    }

    pub fn reconciler(&self) -> OrderReconciler<'a> {
        OrderReconciler::new(self.services, self.meta.now_millis)
    }

    /// Directory profile of the turn's user; `None` for anonymous or unknown users
    pub async fn find_user(&self) -> Result<Option<UserProfile>, ChatError> {
        match self.key.user_id.as_deref() {
            Some(external_id) => Ok(self.services.users.resolve(external_id).await?),
            None => Ok(None),
        }
    }

    pub async fn resolve_user(&self) -> Result<UserProfile, ChatError> {
        self.find_user()
            .await?
            .ok_or_else(|| ChatError::UserNotFound(self.key.user_label().to_string()))
    }

    /// Available catalog item for a request (id first, then name)
    pub async fn resolve_item(&self, req: &RequestedItem) -> Result<Option<MenuItem>, ChatError> {
        let catalog = &self.services.catalog;
        if let Some(id) = req.menu_item_id {
            if let Some(item) = catalog.find_by_id(id).await? {
                return Ok(Some(item).filter(|i| i.is_available));
            }
        }
        match req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Ok(catalog.find_by_name(name).await?.filter(|i| i.is_available)),
            None => Ok(None),
        }
    }

    /// Subtotal of the working cart at current catalog prices
    pub async fn cart_subtotal(&self) -> Result<f64, ChatError> {
        Ok(pricing::subtotal(&self.cart, self.services.catalog.as_ref()).await?)
    }
}

/// What the dispatcher should do with the working cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Unchanged,
    /// Save and flush to the draft
    Updated,
    /// Drop the session entry
    Cleared,
}

/// Handler result
#[derive(Debug, Clone)]
pub struct IntentOutcome {
    pub reply: String,
    pub cart: CartChange,
    pub diagnostics: Vec<String>,
    pub data: Option<Value>,
}

impl IntentOutcome {
    pub fn unchanged(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            cart: CartChange::Unchanged,
            diagnostics: Vec::new(),
            data: None,
        }
    }

    pub fn updated(reply: impl Into<String>) -> Self {
        Self {
            cart: CartChange::Updated,
            ..Self::unchanged(reply)
        }
    }

    pub fn cleared(reply: impl Into<String>) -> Self {
        Self {
            cart: CartChange::Cleared,
            ..Self::unchanged(reply)
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => self.data = Some(value),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize intent data"),
        }
        self
    }
}

/// One intent's state transition
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn execute(&self, ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, ChatError>;
}
