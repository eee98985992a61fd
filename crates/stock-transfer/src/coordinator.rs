//! 調撥協調器
//!
//! 單筆調撥逐品項執行：驗證可用量 → 套用來源/目的增減 →
//! 入帳成對異動 → 失效快取 →（可選）請求出貨。單一品項的失敗
//! 不會擋下其他品項；目的端寫入失敗時回滾來源端，絕不留下
//! 半套用的品項。出貨失敗只以警告回報，已完成的庫存異動不回退，
//! 因為實體調撥可能已經開始。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stock_cache::StockCache;
use stock_core::{
    movement::transfer_reason, LocationId, MovementKind, NewMovement, Result, StockError,
};
use stock_store::{InventoryStore, MovementLedger, MovementQuery};

use crate::shipment::{ShipmentGateway, ShipmentOutcome, ShipmentRequest};

/// 調撥品項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLine {
    pub sku: String,
    pub quantity: i64,
}

/// 一筆調撥請求（邏輯聚合，不持久化）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub from_location: LocationId,
    pub to_location: LocationId,
    pub lines: Vec<TransferLine>,
    pub notes: Option<String>,
    pub create_shipment: bool,
    pub actor: String,
}

impl Transfer {
    /// 創建新的調撥請求
    pub fn new(from: LocationId, to: LocationId, lines: Vec<TransferLine>) -> Self {
        Self {
            from_location: from,
            to_location: to,
            lines,
            notes: None,
            create_shipment: false,
            actor: "system".to_string(),
        }
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// 建構器模式：要求建立出貨單
    pub fn with_shipment(mut self, create_shipment: bool) -> Self {
        self.create_shipment = create_shipment;
        self
    }

    /// 建構器模式：設置操作者
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }
}

/// 單一品項的失敗類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferErrorKind {
    ProductNotFound,
    InsufficientStock,
    StoreError,
}

/// 單一品項的失敗記錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferItemError {
    pub sku: String,
    pub quantity: i64,
    pub kind: TransferErrorKind,
    pub message: String,
}

/// 調撥執行結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    /// 調撥成功的品項
    pub transferred: Vec<TransferLine>,

    /// 逐品項的失敗記錄
    pub errors: Vec<TransferItemError>,

    /// 成功調撥的總數量
    pub total_quantity: i64,

    /// 出貨結果
    pub shipment: ShipmentOutcome,
}

/// 倉位間調撥協調器
pub struct TransferCoordinator {
    store: Arc<InventoryStore>,
    ledger: Arc<MovementLedger>,
    cache: Arc<StockCache>,
    gateway: Option<Arc<dyn ShipmentGateway>>,

    /// 出貨閘道呼叫逾時
    shipment_timeout: Duration,
}

impl TransferCoordinator {
    /// 創建新的協調器
    pub fn new(
        store: Arc<InventoryStore>,
        ledger: Arc<MovementLedger>,
        cache: Arc<StockCache>,
    ) -> Self {
        Self {
            store,
            ledger,
            cache,
            gateway: None,
            shipment_timeout: Duration::from_secs(10),
        }
    }

    /// 建構器模式：設置出貨閘道
    pub fn with_gateway(mut self, gateway: Arc<dyn ShipmentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// 建構器模式：設置出貨逾時
    pub fn with_shipment_timeout(mut self, timeout: Duration) -> Self {
        self.shipment_timeout = timeout;
        self
    }

    /// 執行一筆調撥
    ///
    /// 來源等於目的或品項清單為空時立即拒絕，不產生任何副作用。
    pub async fn execute(&self, transfer: &Transfer) -> Result<TransferResult> {
        if transfer.from_location == transfer.to_location {
            return Err(StockError::Validation(
                "來源與目的倉位不可相同".to_string(),
            ));
        }
        if transfer.lines.is_empty() {
            return Err(StockError::Validation("調撥品項清單不可為空".to_string()));
        }
        for location in [&transfer.from_location, &transfer.to_location] {
            if !self.store.locations().contains(location) {
                return Err(StockError::UnknownLocation(location.to_string()));
            }
        }

        tracing::info!(
            "開始調撥: {} -> {} ({} 品項)",
            transfer.from_location,
            transfer.to_location,
            transfer.lines.len()
        );

        let reason = transfer_reason(
            &transfer.from_location,
            &transfer.to_location,
            transfer.notes.as_deref(),
        );

        let mut transferred = Vec::new();
        let mut errors = Vec::new();
        let mut total_quantity = 0;

        for line in &transfer.lines {
            match self.apply_line(transfer, line, &reason) {
                Ok(()) => {
                    total_quantity += line.quantity;
                    transferred.push(line.clone());
                    self.cache.invalidate(Some(&line.sku));
                }
                Err(item_error) => {
                    tracing::warn!(
                        "調撥品項失敗: sku={} qty={} err={}",
                        line.sku,
                        line.quantity,
                        item_error.message
                    );
                    errors.push(item_error);
                }
            }
        }

        let shipment = if transfer.create_shipment && !transferred.is_empty() {
            self.request_shipment(transfer, &transferred).await
        } else {
            ShipmentOutcome::NotRequested
        };

        tracing::info!(
            "調撥完成: 成功 {} 品項 / 失敗 {} 品項, 總數量 {}",
            transferred.len(),
            errors.len(),
            total_quantity
        );

        Ok(TransferResult {
            transferred,
            errors,
            total_quantity,
            shipment,
        })
    }

    /// 調撥相關的異動歷史（以 reason 的轉倉標記篩選）
    pub fn history(&self, limit: usize) -> Vec<stock_core::StockMovement> {
        self.ledger
            .query(&MovementQuery::default())
            .into_iter()
            .filter(|m| stock_core::movement::is_transfer_reason(&m.reason))
            .take(limit)
            .collect()
    }

    /// 套用單一品項：檢查可用量、成對增減、成對入帳
    fn apply_line(
        &self,
        transfer: &Transfer,
        line: &TransferLine,
        reason: &str,
    ) -> std::result::Result<(), TransferItemError> {
        if line.quantity <= 0 {
            return Err(TransferItemError {
                sku: line.sku.clone(),
                quantity: line.quantity,
                kind: TransferErrorKind::StoreError,
                message: format!("調撥數量必須為正: {}", line.quantity),
            });
        }

        let record = self.store.get(&line.sku).map_err(|err| TransferItemError {
            sku: line.sku.clone(),
            quantity: line.quantity,
            kind: TransferErrorKind::ProductNotFound,
            message: err.to_string(),
        })?;

        let available = record.quantity(&transfer.from_location);
        if available < line.quantity {
            return Err(TransferItemError {
                sku: line.sku.clone(),
                quantity: line.quantity,
                kind: TransferErrorKind::InsufficientStock,
                message: format!(
                    "庫存不足: {} 於 {} 可用 {}, 需要 {}",
                    line.sku, transfer.from_location, available, line.quantity
                ),
            });
        }

        self.store
            .apply_delta(&line.sku, &transfer.from_location, -line.quantity)
            .map_err(|err| TransferItemError {
                sku: line.sku.clone(),
                quantity: line.quantity,
                kind: match err {
                    StockError::InsufficientStock { .. } => TransferErrorKind::InsufficientStock,
                    _ => TransferErrorKind::StoreError,
                },
                message: err.to_string(),
            })?;

        if let Err(err) = self
            .store
            .apply_delta(&line.sku, &transfer.to_location, line.quantity)
        {
            // 目的端失敗：回滾來源端，不留下半套用的品項
            if let Err(rollback_err) =
                self.store
                    .apply_delta(&line.sku, &transfer.from_location, line.quantity)
            {
                tracing::error!(
                    "調撥回滾失敗: sku={} err={}",
                    line.sku,
                    rollback_err
                );
            }
            return Err(TransferItemError {
                sku: line.sku.clone(),
                quantity: line.quantity,
                kind: TransferErrorKind::StoreError,
                message: err.to_string(),
            });
        }

        // 計數器異動成功後才成對入帳
        let out_movement = NewMovement::new(
            &line.sku,
            MovementKind::Out,
            line.quantity,
            transfer.from_location.clone(),
        )
        .with_reason(reason)
        .with_actor(&transfer.actor);

        let in_movement = NewMovement::new(
            &line.sku,
            MovementKind::In,
            line.quantity,
            transfer.to_location.clone(),
        )
        .with_reason(reason)
        .with_actor(&transfer.actor);

        for movement in [out_movement, in_movement] {
            if let Err(err) = self.ledger.append(movement) {
                tracing::error!("調撥異動入帳失敗: sku={} err={}", line.sku, err);
            }
        }

        Ok(())
    }

    /// 請求出貨，逾時或失敗只降級為警告
    async fn request_shipment(
        &self,
        transfer: &Transfer,
        transferred: &[TransferLine],
    ) -> ShipmentOutcome {
        let gateway = match &self.gateway {
            Some(gateway) => gateway.clone(),
            None => {
                return ShipmentOutcome::Failed {
                    warning: "出貨閘道未配置，請手動建立出貨單".to_string(),
                }
            }
        };

        let request = ShipmentRequest {
            items: transferred.to_vec(),
            from_location: transfer.from_location.clone(),
            to_location: transfer.to_location.clone(),
            notes: transfer.notes.clone(),
        };

        match tokio::time::timeout(self.shipment_timeout, gateway.create_transfer(&request)).await
        {
            Ok(Ok(confirmation)) => ShipmentOutcome::Created {
                tracking_reference: confirmation.tracking_reference,
            },
            Ok(Err(err)) => {
                tracing::warn!("出貨單建立失敗，庫存異動保留: {}", err);
                ShipmentOutcome::Failed {
                    warning: format!("庫存已調撥，出貨單建立失敗: {}", err),
                }
            }
            Err(_) => {
                tracing::warn!("出貨閘道逾時 ({:?})，庫存異動保留", self.shipment_timeout);
                ShipmentOutcome::Failed {
                    warning: "庫存已調撥，出貨閘道逾時".to_string(),
                }
            }
        }
    }
}
