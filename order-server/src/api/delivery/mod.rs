//! Delivery fee API
//!
//! `GET /api/delivery-fee?address=Birzeit` - 和提交订单同一套区域规则，
//! 不在任何区域内的地址返回 `UnsupportedDeliveryZone`。

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::chat::ChatError;
use crate::core::ServerState;
use crate::pricing::{DeliveryZones, PricingError, UNSET_ADDRESS};
use crate::utils::{ApiResponse, AppError, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/delivery-fee", get(delivery_fee))
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeeQuery {
    #[validate(length(max = 512))]
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub address: String,
    pub zone: String,
    pub fee: f64,
}

async fn delivery_fee(
    State(state): State<ServerState>,
    Query(query): Query<FeeQuery>,
) -> AppResult<Json<ApiResponse<FeeQuote>>> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    // 与提交订单一致：未填写地址不算免运费
    if DeliveryZones::is_unset(&query.address) {
        return Err(ChatError::UnsupportedDeliveryZone(UNSET_ADDRESS.to_string()).into());
    }

    let zones = &state.services().zones;
    let fee = zones
        .delivery_fee(&query.address)
        .map_err(|e: PricingError| AppError::from(ChatError::from(e)))?;
    let zone = zones
        .zone_for(&query.address)
        .map(|z| z.name.clone())
        .unwrap_or_default();

    Ok(ok(FeeQuote {
        address: query.address.trim().to_string(),
        zone,
        fee,
    }))
}
