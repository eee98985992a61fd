//! 庫存主檔模型

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::{LocationId, LocationSet};
use crate::{Result, StockError};

/// 單一 SKU 的庫存主檔
///
/// 不變式：`total` 恆等於各倉位數量之和，且任何倉位數量不得為負。
/// 主檔一旦建立就不會刪除；全部歸零的 SKU 仍保留全零的主檔。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// SKU
    pub sku: String,

    /// 商品名稱（列表顯示用）
    pub name: Option<String>,

    /// 各倉位庫存數量
    pub quantities: BTreeMap<LocationId, i64>,

    /// 總庫存（衍生欄位）
    pub total: i64,

    /// 最後更新時間
    pub last_updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// 創建新的庫存主檔，所有倉位歸零
    pub fn new(sku: impl Into<String>, locations: &LocationSet) -> Self {
        let quantities = locations.iter().map(|l| (l.clone(), 0)).collect();
        Self {
            sku: sku.into(),
            name: None,
            quantities,
            total: 0,
            last_updated_at: Utc::now(),
        }
    }

    /// 建構器模式：設置商品名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 取得某倉位的數量（未知倉位視為 0）
    pub fn quantity(&self, location: &LocationId) -> i64 {
        self.quantities.get(location).copied().unwrap_or(0)
    }

    /// 管理性覆寫某倉位的數量
    ///
    /// 僅供同時寫入流水帳的上層操作使用，不可單獨暴露。
    pub fn set_quantity(&mut self, location: &LocationId, quantity: i64) -> Result<()> {
        if quantity < 0 {
            return Err(StockError::Validation(format!(
                "倉位數量不可為負: {} = {}",
                location, quantity
            )));
        }
        self.quantities.insert(location.clone(), quantity);
        self.recompute_total();
        self.last_updated_at = Utc::now();
        Ok(())
    }

    /// 對某倉位套用增減量
    ///
    /// 結果為負時拒絕並回傳 [`StockError::InsufficientStock`]，
    /// 主檔維持原狀。
    pub fn apply_delta(&mut self, location: &LocationId, delta: i64) -> Result<()> {
        let current = self.quantity(location);
        let next = current.checked_add(delta).ok_or_else(|| {
            StockError::Validation(format!(
                "倉位數量溢位: {} {} + {}",
                location, current, delta
            ))
        })?;
        if next < 0 {
            return Err(StockError::InsufficientStock {
                sku: self.sku.clone(),
                location: location.to_string(),
                requested: -delta,
                available: current,
            });
        }
        self.quantities.insert(location.clone(), next);
        self.recompute_total();
        self.last_updated_at = Utc::now();
        Ok(())
    }

    /// 重新計算總庫存
    pub fn recompute_total(&mut self) {
        self.total = self.quantities.values().sum();
    }

    /// 有庫存的倉位（數量 > 0）
    pub fn non_zero_quantities(&self) -> Vec<(LocationId, i64)> {
        self.quantities
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .map(|(l, qty)| (l.clone(), *qty))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InventoryRecord {
        InventoryRecord::new("TRI-2041-NAV", &LocationSet::default_pair())
    }

    #[test]
    fn test_new_record_is_zeroed() {
        let record = record();
        assert_eq!(record.total, 0);
        assert_eq!(record.quantities.len(), 2);
        assert!(record.non_zero_quantities().is_empty());
    }

    #[test]
    fn test_with_name() {
        let record = record().with_name("Triko Navy");
        assert_eq!(record.name.as_deref(), Some("Triko Navy"));
    }

    #[test]
    fn test_apply_delta_updates_total() {
        let mut record = record();
        let chodov = LocationId::new("chodov");
        let outlet = LocationId::new("outlet");

        record.apply_delta(&chodov, 7).unwrap();
        record.apply_delta(&outlet, 3).unwrap();
        record.apply_delta(&chodov, -2).unwrap();

        assert_eq!(record.quantity(&chodov), 5);
        assert_eq!(record.quantity(&outlet), 3);
        assert_eq!(record.total, 8);
        assert_eq!(record.total, record.quantities.values().sum::<i64>());
    }

    #[test]
    fn test_negative_result_rejected() {
        let mut record = record();
        let chodov = LocationId::new("chodov");
        record.apply_delta(&chodov, 3).unwrap();

        let err = record.apply_delta(&chodov, -8).unwrap_err();
        assert!(matches!(
            err,
            StockError::InsufficientStock {
                requested: 8,
                available: 3,
                ..
            }
        ));
        // 失敗時主檔不變
        assert_eq!(record.quantity(&chodov), 3);
        assert_eq!(record.total, 3);
    }

    #[test]
    fn test_overflowing_delta_rejected() {
        let mut record = record();
        let chodov = LocationId::new("chodov");
        record.apply_delta(&chodov, i64::MAX).unwrap();

        let err = record.apply_delta(&chodov, 1).unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
        // 溢位時主檔不變
        assert_eq!(record.quantity(&chodov), i64::MAX);
    }

    #[test]
    fn test_set_quantity_rejects_negative() {
        let mut record = record();
        let outlet = LocationId::new("outlet");
        assert!(record.set_quantity(&outlet, -1).is_err());
        assert!(record.set_quantity(&outlet, 4).is_ok());
        assert_eq!(record.total, 4);
    }
}
