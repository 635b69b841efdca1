//! IntentDispatcher - 对话 turn 的唯一入口
//!
//! 一个 turn 的处理流程：
//!
//! ```text
//! lock(session) → IntentPayload ──TryFrom──► Intent ──From──► IntentAction
//!                                                   │
//!                         IntentContext(cart 副本) ─┤ execute()
//!                                                   ▼
//!                      CartChange::Updated  → save + flush_to_draft
//!                      CartChange::Cleared  → clear
//!                      CartChange::Unchanged → -
//! ```
//!
//! 可恢复的 [`ChatError`] 变成带错误码的回复；存储故障和超时
//! 以 [`EngineError`] 返回给调用方。整个 turn 受 `store_timeout` 约束。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::ErrorCode;
use shared::intent::{Intent, IntentKind, IntentPayload};
use shared::models::CartLine;
use shared::util::now_millis;
use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

use super::actions::IntentAction;
use super::error::{ChatError, EngineError};
use super::reconciler::{FlushReport, OrderReconciler};
use super::session::{SessionKey, SessionLocks};
use super::traits::{CartChange, ChatServices, IntentContext, IntentHandler, IntentMetadata};
use crate::pricing;
use crate::utils::time::business_date;

#[cfg(test)]
mod tests;

/// Who is talking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMeta {
    pub conversation_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl TurnMeta {
    pub fn new(conversation_id: impl Into<String>, user_id: Option<&str>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.map(str::to_string),
        }
    }

    fn key(&self) -> SessionKey {
        SessionKey::new(self.conversation_id.as_str(), self.user_id.as_deref())
    }
}

/// Reply for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReply {
    pub turn_id: String,
    pub reply: String,
    pub intent: Option<IntentKind>,
    pub success: bool,
    pub error_code: Option<ErrorCode>,
    pub diagnostics: Vec<String>,
    /// Cart after the turn
    pub cart: Vec<CartLine>,
    pub subtotal: f64,
    pub data: Option<Value>,
}

/// Session state after start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub lines_loaded: usize,
    pub cart: Vec<CartLine>,
    pub subtotal: f64,
}

pub struct IntentDispatcher {
    services: ChatServices,
    locks: SessionLocks,
}

impl IntentDispatcher {
    pub fn new(services: ChatServices) -> Self {
        Self {
            services,
            locks: SessionLocks::new(),
        }
    }

    pub fn services(&self) -> &ChatServices {
        &self.services
    }

    /// Run `fut` under the turn timeout
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, EngineError>>,
    ) -> Result<T, EngineError> {
        let limit = self.services.store_timeout;
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = limit.as_millis() as u64, "Chat turn timed out");
                Err(EngineError::Timeout(limit))
            }
        }
    }

    pub async fn handle_turn(
        &self,
        meta: TurnMeta,
        payload: IntentPayload,
    ) -> Result<TurnReply, EngineError> {
        self.handle_turn_at(meta, payload, now_millis()).await
    }

    /// [`handle_turn`](Self::handle_turn) with an explicit clock
    pub async fn handle_turn_at(
        &self,
        meta: TurnMeta,
        payload: IntentPayload,
        now: i64,
    ) -> Result<TurnReply, EngineError> {
        let key = meta.key();
        let turn_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "chat_turn",
            turn_id = %turn_id,
            conversation_id = %key.conversation_id,
            user_id = %key.user_label(),
            intent = tracing::field::Empty,
        );

        self.bounded(self.run_turn(key, turn_id, payload, now))
            .instrument(span)
            .await
    }

    async fn run_turn(
        &self,
        key: SessionKey,
        turn_id: String,
        payload: IntentPayload,
        now: i64,
    ) -> Result<TurnReply, EngineError> {
        let _guard = self.locks.acquire(&key).await;

        let intent = match Intent::try_from(payload) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::info!(error = %e, "Malformed intent payload");
                let err = ChatError::from(e);
                return self.rejected(&key, turn_id, None, &err).await;
            }
        };
        let kind = intent.kind();
        tracing::Span::current().record("intent", kind.as_str());

        let meta = IntentMetadata {
            conversation_id: key.conversation_id.clone(),
            user_id: key.user_id.clone(),
            turn_id: turn_id.clone(),
            now_millis: now,
            today: business_date(now, self.services.policy.timezone),
        };
        let cart = self.services.sessions.get(&key);
        let mut ctx = IntentContext::new(key.clone(), cart, &meta, &self.services);

        let action = IntentAction::from(intent);
        let outcome = match action.execute(&mut ctx).await {
            Ok(outcome) => outcome,
            Err(err) if err.is_recoverable() => {
                tracing::info!(code = %err.error_code(), error = %err, "Intent rejected");
                return self.rejected(&key, turn_id, Some(kind), &err).await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Intent failed");
                return Err(err.into());
            }
        };

        let IntentContext { cart, .. } = ctx;
        match outcome.cart {
            CartChange::Unchanged => {}
            CartChange::Updated => {
                self.services.sessions.save(&key, cart);
                OrderReconciler::new(&self.services, now)
                    .flush_to_draft(&key)
                    .await?;
            }
            CartChange::Cleared => self.services.sessions.clear(&key),
        }

        let (cart, subtotal) = self.current_cart(&key).await?;
        tracing::info!(lines = cart.len(), subtotal, "Turn completed");
        Ok(TurnReply {
            turn_id,
            reply: outcome.reply,
            intent: Some(kind),
            success: true,
            error_code: None,
            diagnostics: outcome.diagnostics,
            cart,
            subtotal,
            data: outcome.data,
        })
    }

    async fn rejected(
        &self,
        key: &SessionKey,
        turn_id: String,
        intent: Option<IntentKind>,
        err: &ChatError,
    ) -> Result<TurnReply, EngineError> {
        let (cart, subtotal) = self.current_cart(key).await?;
        Ok(TurnReply {
            turn_id,
            reply: err.user_message(),
            intent,
            success: false,
            error_code: Some(err.error_code()),
            diagnostics: vec![err.to_string()],
            cart,
            subtotal,
            data: None,
        })
    }

    async fn current_cart(&self, key: &SessionKey) -> Result<(Vec<CartLine>, f64), EngineError> {
        let cart = self.services.sessions.get(key);
        let subtotal = pricing::subtotal(&cart, self.services.catalog.as_ref()).await?;
        Ok((cart, subtotal))
    }

    /// Rehydrate the session cart from the user's Draft
    pub async fn start_session(&self, meta: TurnMeta) -> Result<SessionSnapshot, EngineError> {
        let key = meta.key();
        let span = tracing::info_span!(
            "chat_session_start",
            conversation_id = %key.conversation_id,
            user_id = %key.user_label(),
        );
        self.bounded(async {
            let _guard = self.locks.acquire(&key).await;
            let lines_loaded = OrderReconciler::new(&self.services, now_millis())
                .load_into_session(&key)
                .await?;
            let (cart, subtotal) = self.current_cart(&key).await?;
            Ok::<_, EngineError>(SessionSnapshot {
                lines_loaded,
                cart,
                subtotal,
            })
        })
        .instrument(span)
        .await
    }

    /// Flush the cart to the Draft and drop the in-memory entry
    pub async fn end_session(&self, meta: TurnMeta) -> Result<FlushReport, EngineError> {
        let key = meta.key();
        let span = tracing::info_span!(
            "chat_session_end",
            conversation_id = %key.conversation_id,
            user_id = %key.user_label(),
        );
        let report = self
            .bounded(async {
                let _guard = self.locks.acquire(&key).await;
                let report = OrderReconciler::new(&self.services, now_millis())
                    .flush_to_draft(&key)
                    .await?;
                self.services.sessions.clear(&key);
                Ok::<_, EngineError>(report)
            })
            .instrument(span)
            .await?;
        self.locks.forget(&key);
        Ok(report)
    }
}
