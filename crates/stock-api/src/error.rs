//! API 錯誤對應
//!
//! 錯誤分類到 HTTP 狀態碼的唯一對應點：驗證錯誤 400、
//! 查無資料 404、庫存不足 409、外部服務不可用 502。
//! 批次操作的逐品項錯誤不走這裡，而是累積在回應主體中。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stock_core::StockError;

/// HTTP 層錯誤包裝
#[derive(Debug)]
pub struct ApiError(pub StockError);

/// 錯誤回應主體
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            StockError::Validation(_)
            | StockError::InvalidMovement(_)
            | StockError::UnknownLocation(_) => StatusCode::BAD_REQUEST,
            StockError::SkuNotFound(_) => StatusCode::NOT_FOUND,
            StockError::InsufficientStock { .. } => StatusCode::CONFLICT,
            StockError::Upstream(_) => StatusCode::BAD_GATEWAY,
            StockError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match &self.0 {
            StockError::Validation(_) => "validation_error",
            StockError::InvalidMovement(_) => "invalid_movement",
            StockError::UnknownLocation(_) => "unknown_location",
            StockError::SkuNotFound(_) => "sku_not_found",
            StockError::InsufficientStock { .. } => "insufficient_stock",
            StockError::Upstream(_) => "upstream_unavailable",
            StockError::Other(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        Self(err)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
