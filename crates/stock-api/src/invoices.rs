//! 進貨發票確認端點
//!
//! 發票的 OCR 擷取在子系統之外；這裡只接收已確認的品項清單，
//! 逐項入帳為入庫異動。單一品項失敗不會中斷整批，
//! 回應同時帶成功與失敗清單供呼叫端對帳。

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use stock_core::{MovementKind, NewMovement, StockError};
use stock_store::post_movement;
use stock_transfer::TransferLine;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `POST /invoices/confirm` 請求主體
#[derive(Debug, Deserialize)]
pub struct ConfirmInvoiceRequest {
    #[serde(alias = "invoiceNumber")]
    pub invoice_number: String,
    pub items: Vec<TransferLine>,
    pub location: String,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

/// 單一品項的入帳失敗
#[derive(Debug, Serialize)]
pub struct InvoiceItemError {
    pub sku: String,
    pub quantity: i64,
    pub error: String,
}

/// 確認回應
#[derive(Debug, Serialize)]
pub struct ConfirmInvoiceResponse {
    pub invoice_number: String,
    pub received: Vec<TransferLine>,
    pub errors: Vec<InvoiceItemError>,
    pub total_quantity: i64,
}

/// `POST /invoices/confirm` — 整批入庫，以發票號碼為 reason
pub async fn confirm_invoice(
    State(state): State<AppState>,
    Json(request): Json<ConfirmInvoiceRequest>,
) -> ApiResult<Json<ConfirmInvoiceResponse>> {
    if request.invoice_number.trim().is_empty() {
        return Err(ApiError(StockError::Validation(
            "發票號碼不可為空".to_string(),
        )));
    }
    if request.items.is_empty() {
        return Err(ApiError(StockError::Validation(
            "發票品項清單不可為空".to_string(),
        )));
    }

    let location = state.config.locations.resolve(&request.location)?;
    let reason = format!("invoice {}", request.invoice_number.trim());
    let actor = request.user_id.as_deref().unwrap_or("system");

    let mut received = Vec::new();
    let mut errors = Vec::new();
    let mut total_quantity = 0;

    for item in request.items {
        let movement = NewMovement::new(
            &item.sku,
            MovementKind::In,
            item.quantity,
            location.clone(),
        )
        .with_reason(&reason)
        .with_actor(actor);

        match post_movement(&state.store, &state.ledger, movement) {
            Ok(_) => {
                state.cache.invalidate(Some(&item.sku));
                total_quantity += item.quantity;
                received.push(item);
            }
            Err(err) => {
                tracing::warn!(
                    "發票品項入帳失敗: invoice={} sku={} err={}",
                    request.invoice_number,
                    item.sku,
                    err
                );
                errors.push(InvoiceItemError {
                    sku: item.sku,
                    quantity: item.quantity,
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(Json(ConfirmInvoiceResponse {
        invoice_number: request.invoice_number,
        received,
        errors,
        total_quantity,
    }))
}
