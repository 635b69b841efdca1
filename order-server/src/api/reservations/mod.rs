//! Reservation API
//!
//! `GET /api/reservations?user_id=demo` - 用户的全部订座，按日期时间排序。
//! 创建订座只走对话 (`reserve` 意图)。

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::models::Reservation;
use validator::Validate;

use crate::api::orders::resolve_user;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reservations", get(list))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReservationQuery {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
}

async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<ApiResponse<Vec<Reservation>>>> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let services = state.services();
    let user = resolve_user(services, &query.user_id).await?;
    let reservations = services.reservations.list_for_user(user.id).await?;
    Ok(ok(reservations))
}
