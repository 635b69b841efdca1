//! Order history API
//!
//! `GET /api/orders/history?user_id=demo&limit=5`

mod handler;

pub(crate) use handler::resolve_user;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/orders/history", get(handler::list_history))
}
