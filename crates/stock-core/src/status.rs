//! 庫存狀態解析
//!
//! 純函數層：由原始數量推導使用者可見的狀態與排序優先權，
//! 呼叫端用 `priority` 排序（例如按稀缺度排變體），不需重算門檻。

use serde::{Deserialize, Serialize};

use crate::stock::{LocationQuantity, ProductStock};

/// 狀態門檻（遞增）
pub const OUT_OF_STOCK_THRESHOLD: i64 = 0;
pub const LOW_STOCK_THRESHOLD: i64 = 3;
pub const LIMITED_STOCK_THRESHOLD: i64 = 10;

/// 狀態層級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatusKind {
    OutOfStock,
    LowStock,
    AvailableAtBranch,
    InStock,
}

impl StockStatusKind {
    /// 排序優先權（0 = 最稀缺）
    pub fn priority(&self) -> u8 {
        match self {
            StockStatusKind::OutOfStock => 0,
            StockStatusKind::LowStock => 1,
            StockStatusKind::AvailableAtBranch => 2,
            StockStatusKind::InStock => 3,
        }
    }
}

/// 使用者可見的庫存狀態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockStatus {
    /// 狀態層級
    pub kind: StockStatusKind,

    /// 排序優先權（衍生自層級）
    pub priority: u8,

    /// 顯示文字
    pub label: String,

    /// 有庫存的倉位明細（缺貨時為空）
    pub locations: Vec<LocationQuantity>,
}

/// 由庫存快照解析狀態（純函數，無隱藏狀態）
pub fn resolve(stock: &ProductStock) -> StockStatus {
    if stock.total <= OUT_OF_STOCK_THRESHOLD {
        return StockStatus {
            kind: StockStatusKind::OutOfStock,
            priority: StockStatusKind::OutOfStock.priority(),
            label: "out of stock".to_string(),
            locations: Vec::new(),
        };
    }

    // 集中在單一倉位時顯示倉位名稱，分散在多個倉位時省略
    let single_location = if stock.locations.len() == 1 {
        Some(stock.locations[0].location.to_string())
    } else {
        None
    };

    let kind = if stock.total <= LOW_STOCK_THRESHOLD {
        StockStatusKind::LowStock
    } else if stock.total <= LIMITED_STOCK_THRESHOLD {
        StockStatusKind::AvailableAtBranch
    } else {
        StockStatusKind::InStock
    };

    let label = match (kind, single_location) {
        (StockStatusKind::LowStock, Some(location)) => {
            format!("last pieces at {}", location)
        }
        (StockStatusKind::LowStock, None) => "last pieces".to_string(),
        (StockStatusKind::AvailableAtBranch, Some(location)) => {
            format!("available at {}", location)
        }
        (StockStatusKind::AvailableAtBranch, None) => "available at branches".to_string(),
        _ => "in stock".to_string(),
    };

    StockStatus {
        kind,
        priority: kind.priority(),
        label,
        locations: stock.locations.clone(),
    }
}
