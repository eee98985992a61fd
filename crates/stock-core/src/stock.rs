//! 商品庫存讀取聚合
//!
//! 衍生資料，非權威來源；由快取在未命中或過期時重建，
//! 任何時候丟棄重算都是安全的。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::LocationId;
use crate::record::InventoryRecord;
use crate::status::LOW_STOCK_THRESHOLD;

/// 單一倉位的庫存數量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuantity {
    pub location: LocationId,
    pub quantity: i64,
}

/// 商品庫存快照（快取單位）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStock {
    /// SKU
    pub sku: String,

    /// 總庫存
    pub total: i64,

    /// 有庫存的倉位明細
    pub locations: Vec<LocationQuantity>,

    /// 是否可售（總庫存 > 0）
    pub available: bool,

    /// 是否低庫存
    pub low_stock: bool,

    /// 快照時間（快取新鮮度依據）
    pub fetched_at: DateTime<Utc>,
}

impl ProductStock {
    /// 由庫存主檔建立快照
    pub fn from_record(record: &InventoryRecord) -> Self {
        let locations = record
            .non_zero_quantities()
            .into_iter()
            .map(|(location, quantity)| LocationQuantity { location, quantity })
            .collect();

        Self {
            sku: record.sku.clone(),
            total: record.total,
            locations,
            available: record.total > 0,
            low_stock: record.total > 0 && record.total <= LOW_STOCK_THRESHOLD,
            fetched_at: Utc::now(),
        }
    }

    /// 保守的零庫存快照（讀取路徑降級用）
    pub fn zero(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            total: 0,
            locations: Vec::new(),
            available: false,
            low_stock: false,
            fetched_at: Utc::now(),
        }
    }
}
