//! Chat API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::intent::IntentPayload;
use validator::Validate;

use crate::chat::{FlushReport, SessionSnapshot, TurnMeta, TurnReply};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TurnRequest {
    #[validate(length(min = 1, max = 128))]
    pub conversation_id: String,
    #[validate(length(min = 1, max = 128))]
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub payload: IntentPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(length(min = 1, max = 128))]
    pub conversation_id: String,
    #[validate(length(min = 1, max = 128))]
    #[serde(default)]
    pub user_id: Option<String>,
}

fn validated<T: Validate>(req: &T) -> AppResult<()> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// POST /api/chat/turn - 处理一轮对话
///
/// 业务拒绝（空购物车、闭店日…）也是 200：错误码在 `TurnReply` 里。
pub async fn turn(
    State(state): State<ServerState>,
    Json(req): Json<TurnRequest>,
) -> AppResult<Json<ApiResponse<TurnReply>>> {
    validated(&req)?;
    let meta = TurnMeta::new(req.conversation_id, req.user_id.as_deref());
    let reply = state.dispatcher.handle_turn(meta, req.payload).await?;
    Ok(ok(reply))
}

/// POST /api/chat/session/start - 从 Draft 恢复购物车
pub async fn start_session(
    State(state): State<ServerState>,
    Json(req): Json<SessionRequest>,
) -> AppResult<Json<ApiResponse<SessionSnapshot>>> {
    validated(&req)?;
    let meta = TurnMeta::new(req.conversation_id, req.user_id.as_deref());
    let snapshot = state.dispatcher.start_session(meta).await?;
    Ok(ok(snapshot))
}

/// POST /api/chat/session/end - 落盘并释放会话
pub async fn end_session(
    State(state): State<ServerState>,
    Json(req): Json<SessionRequest>,
) -> AppResult<Json<ApiResponse<FlushReport>>> {
    validated(&req)?;
    let meta = TurnMeta::new(req.conversation_id, req.user_id.as_deref());
    let report = state.dispatcher.end_session(meta).await?;
    Ok(ok(report))
}
