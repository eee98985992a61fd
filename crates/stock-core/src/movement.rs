//! 庫存異動模型
//!
//! 流水帳只增不改：修正以新的補償異動表示，不回頭編輯歷史。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::LocationId;
use crate::{Result, StockError};

/// 轉倉異動的 reason 標記前綴
pub const TRANSFER_REASON_PREFIX: &str = "transfer:";

/// 異動方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// 入庫（進貨、轉入、修正調增）
    In,
    /// 出庫（銷售、轉出、修正調減）
    Out,
}

impl MovementKind {
    /// 依方向換算有號增減量
    pub fn signed(&self, quantity: i64) -> i64 {
        match self {
            MovementKind::In => quantity,
            MovementKind::Out => -quantity,
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementKind::In => write!(f, "in"),
            MovementKind::Out => write!(f, "out"),
        }
    }
}

/// 已入帳的庫存異動（不可變）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    /// 單調遞增的流水號
    pub id: u64,

    /// SKU
    pub sku: String,

    /// 異動方向
    pub kind: MovementKind,

    /// 異動數量（恆為正）
    pub quantity: i64,

    /// 倉位
    pub location: LocationId,

    /// 異動原因/類別（自由文字）
    pub reason: String,

    /// 操作者
    pub actor: String,

    /// 異動時間
    pub occurred_at: DateTime<Utc>,
}

/// 待入帳的庫存異動
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub sku: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub location: LocationId,
    pub reason: String,
    pub actor: String,
}

impl NewMovement {
    /// 創建新的待入帳異動
    pub fn new(
        sku: impl Into<String>,
        kind: MovementKind,
        quantity: i64,
        location: LocationId,
    ) -> Self {
        Self {
            sku: sku.into(),
            kind,
            quantity,
            location,
            reason: String::new(),
            actor: "system".to_string(),
        }
    }

    /// 建構器模式：設置原因
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// 建構器模式：設置操作者
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// 驗證輸入格式
    pub fn validate(&self) -> Result<()> {
        if self.sku.trim().is_empty() {
            return Err(StockError::InvalidMovement("SKU 不可為空".to_string()));
        }
        if self.quantity <= 0 {
            return Err(StockError::InvalidMovement(format!(
                "異動數量必須為正: {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// 組合轉倉異動共用的 reason 字串
pub fn transfer_reason(from: &LocationId, to: &LocationId, notes: Option<&str>) -> String {
    match notes {
        Some(notes) if !notes.trim().is_empty() => {
            format!("{} {} -> {} | {}", TRANSFER_REASON_PREFIX, from, to, notes.trim())
        }
        _ => format!("{} {} -> {}", TRANSFER_REASON_PREFIX, from, to),
    }
}

/// 檢查 reason 是否帶有轉倉標記
pub fn is_transfer_reason(reason: &str) -> bool {
    reason.starts_with(TRANSFER_REASON_PREFIX)
}
