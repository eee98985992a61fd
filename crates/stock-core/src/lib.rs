//! # Stock Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod location;
pub mod movement;
pub mod record;
pub mod sku;
pub mod status;
pub mod stock;

// Re-export 主要類型
pub use config::StockConfig;
pub use location::{LocationId, LocationSet};
pub use movement::{MovementKind, NewMovement, StockMovement};
pub use record::InventoryRecord;
pub use sku::SkuParts;
pub use status::{StockStatus, StockStatusKind};
pub use stock::{LocationQuantity, ProductStock};

/// 庫存子系統錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("驗證失敗: {0}")]
    Validation(String),

    #[error("找不到 SKU: {0}")]
    SkuNotFound(String),

    #[error("未知的倉位: {0}")]
    UnknownLocation(String),

    #[error("庫存不足: SKU {sku} 於 {location} 需要 {requested}, 可用 {available}")]
    InsufficientStock {
        sku: String,
        location: String,
        requested: i64,
        available: i64,
    },

    #[error("無效的庫存異動: {0}")]
    InvalidMovement(String),

    #[error("外部服務不可用: {0}")]
    Upstream(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StockError>;
