//! 统一错误处理
//!
//! HTTP 层统一使用 `shared::error` 的错误码体系：
//! - [`AppError`] - 错误码 + 消息 + 详情
//! - [`ApiResponse`] - 统一响应信封
//!
//! 本模块只补充服务端内部错误到 [`AppError`] 的转换。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("User demo"))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::db::StoreError;

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::not_found(what),
            StoreError::Database(msg) => AppError::database(msg),
            StoreError::Internal(msg) => AppError::internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err: AppError = StoreError::Database("locked".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        let err: AppError = StoreError::NotFound("Order 3".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order 3 not found");
    }

    #[test]
    fn test_ok_envelope() {
        let Json(body) = ok(42);
        assert_eq!(body.code, Some(0));
        assert_eq!(body.data, Some(42));
    }
}
