//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 简单健康检查 |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "storage": "sqlite", "active_sessions": 2 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::{ServerState, StorageKind};

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
    /// 内存中的会话购物车数量
    active_sessions: usize,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let storage = match state.config.storage {
        StorageKind::Sqlite => "sqlite",
        StorageKind::Memory => "memory",
    };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage,
        active_sessions: state.services().sessions.len(),
    })
}
