//! 出貨閘道介面
//!
//! 外部物流 API 的抽象：調撥協調器只透過這個 trait 請求實體
//! 出貨單。閘道失敗不得污染庫存狀態。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stock_core::{LocationId, Result};

use crate::coordinator::TransferLine;

/// 出貨單請求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRequest {
    /// 實際調撥成功的品項
    pub items: Vec<TransferLine>,
    pub from_location: LocationId,
    pub to_location: LocationId,
    pub notes: Option<String>,
}

/// 出貨單建立成功的回執
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentConfirmation {
    /// 物流追蹤編號
    pub tracking_reference: String,
}

/// 出貨結果（附加在調撥結果上）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShipmentOutcome {
    /// 呼叫端未要求出貨
    NotRequested,
    /// 出貨單建立成功
    Created { tracking_reference: String },
    /// 出貨失敗；庫存異動不回滾，以警告回報
    Failed { warning: String },
}

/// 物流閘道
#[async_trait]
pub trait ShipmentGateway: Send + Sync {
    /// 為一筆調撥請求建立實體出貨單
    async fn create_transfer(&self, request: &ShipmentRequest) -> Result<ShipmentConfirmation>;
}

/// 測試與示範用閘道：以 UUID 產生追蹤編號
pub struct InProcessGateway;

#[async_trait]
impl ShipmentGateway for InProcessGateway {
    async fn create_transfer(&self, request: &ShipmentRequest) -> Result<ShipmentConfirmation> {
        tracing::info!(
            "建立出貨單: {} -> {} ({} 品項)",
            request.from_location,
            request.to_location,
            request.items.len()
        );
        Ok(ShipmentConfirmation {
            tracking_reference: format!("SHIP-{}", uuid::Uuid::new_v4()),
        })
    }
}
