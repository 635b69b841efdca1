//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`chat`] - 对话 turn / 会话开始与结束
//! - [`delivery`] - 配送费预估
//! - [`orders`] - 历史订单
//! - [`reservations`] - 订座查询

pub mod chat;
pub mod delivery;
pub mod health;
pub mod orders;
pub mod reservations;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware
pub fn routes() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(delivery::router())
        .merge(orders::router())
        .merge(reservations::router())
}

/// Fully configured application (middleware + state)
pub fn build_router(state: ServerState) -> Router {
    routes()
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .with_state(state)
}
