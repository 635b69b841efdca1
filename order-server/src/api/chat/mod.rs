//! Chat API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/chat/turn | POST | 处理一轮对话（一个工具调用） |
//! | /api/chat/session/start | POST | 从 Draft 恢复购物车 |
//! | /api/chat/session/end | POST | 落盘并释放会话 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::{SessionRequest, TurnRequest};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/chat", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/turn", post(handler::turn))
        .route("/session/start", post(handler::start_session))
        .route("/session/end", post(handler::end_session))
}
