//! 倉位間調撥端點

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use stock_core::StockMovement;
use stock_transfer::{Transfer, TransferLine, TransferResult};

use crate::error::ApiResult;
use crate::AppState;

/// `POST /transfers` 請求主體
#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    pub items: Vec<TransferLine>,
    #[serde(alias = "fromLocation")]
    pub from_location: String,
    #[serde(alias = "toLocation")]
    pub to_location: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "createShipment")]
    pub create_shipment: bool,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

/// `POST /transfers` — 執行調撥
///
/// 逐品項結果（成功清單 + 失敗清單）都在回應主體中；
/// 只有整筆請求無效（同倉位、空清單、未知倉位）才回傳錯誤狀態碼。
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(request): Json<CreateTransferRequest>,
) -> ApiResult<Json<TransferResult>> {
    let from = state.config.locations.resolve(&request.from_location)?;
    let to = state.config.locations.resolve(&request.to_location)?;

    let mut transfer = Transfer::new(from, to, request.items)
        .with_shipment(request.create_shipment)
        .with_actor(request.user_id.unwrap_or_else(|| "system".to_string()));
    if let Some(notes) = request.notes {
        transfer = transfer.with_notes(notes);
    }

    let result = state.coordinator.execute(&transfer).await?;
    Ok(Json(result))
}

/// `GET /transfers` 查詢參數
#[derive(Debug, Default, Deserialize)]
pub struct TransferHistoryQuery {
    pub limit: Option<usize>,
}

/// 調撥歷史回應
#[derive(Debug, Serialize)]
pub struct TransferHistoryResponse {
    pub movements: Vec<StockMovement>,
}

/// `GET /transfers` — 帶轉倉標記的異動歷史
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<TransferHistoryQuery>,
) -> ApiResult<Json<TransferHistoryResponse>> {
    let movements = state.coordinator.history(query.limit.unwrap_or(50));
    Ok(Json(TransferHistoryResponse { movements }))
}
