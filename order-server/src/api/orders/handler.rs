//! Order API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::UserProfile;
use validator::Validate;

use crate::chat::{ChatError, ChatServices};
use crate::core::ServerState;
use crate::orders::{OrderSummary, history};
use crate::utils::{ApiResponse, AppError, AppResult, ok};

#[derive(Debug, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    pub limit: Option<u32>,
}

/// 外部 user id → 用户档案，不存在时 404
pub(crate) async fn resolve_user(services: &ChatServices, user_id: &str) -> AppResult<UserProfile> {
    services
        .users
        .resolve(user_id)
        .await?
        .ok_or_else(|| ChatError::UserNotFound(user_id.to_string()).into())
}

/// GET /api/orders/history - 最近订单（按当前菜单价计价）
pub async fn list_history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<OrderSummary>>>> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let services = state.services();
    let user = resolve_user(services, &query.user_id).await?;
    let limit = services.policy.history_limit(query.limit);
    let summaries = history::recent_summaries(services, user.id, limit).await?;
    Ok(ok(summaries))
}
