//! 庫存計數器儲存
//!
//! 併發模型：每個 SKU 一把互斥鎖，`apply_delta` 在同一把鎖內完成
//! 檢查與寫入，兩個併發請求對同一 SKU 的增減不會交錯遺失更新。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use stock_core::{InventoryRecord, LocationId, LocationSet, Result, StockError};

/// 當下各倉位庫存的唯一權威來源
pub struct InventoryStore {
    /// 認可的倉位集合
    locations: LocationSet,

    /// SKU → 主檔（外層 RwLock 保護索引，內層 Mutex 序列化單一 SKU 的寫入）
    records: RwLock<HashMap<String, Arc<Mutex<InventoryRecord>>>>,
}

impl InventoryStore {
    /// 創建新的庫存儲存
    pub fn new(locations: LocationSet) -> Self {
        Self {
            locations,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// 倉位集合
    pub fn locations(&self) -> &LocationSet {
        &self.locations
    }

    /// 讀取單一 SKU 的主檔
    pub fn get(&self, sku: &str) -> Result<InventoryRecord> {
        let records = self.records.read().expect("records lock poisoned");
        records
            .get(sku)
            .map(|cell| cell.lock().expect("record lock poisoned").clone())
            .ok_or_else(|| StockError::SkuNotFound(sku.to_string()))
    }

    /// 批次讀取；不存在的 SKU 直接缺席，不是錯誤
    pub fn get_batch(&self, skus: &[String]) -> HashMap<String, InventoryRecord> {
        let records = self.records.read().expect("records lock poisoned");
        skus.iter()
            .filter_map(|sku| {
                records
                    .get(sku)
                    .map(|cell| (sku.clone(), cell.lock().expect("record lock poisoned").clone()))
            })
            .collect()
    }

    /// 列出所有主檔
    pub fn list(&self) -> Vec<InventoryRecord> {
        let records = self.records.read().expect("records lock poisoned");
        records
            .values()
            .map(|cell| cell.lock().expect("record lock poisoned").clone())
            .collect()
    }

    /// 已知 SKU 數量
    pub fn len(&self) -> usize {
        self.records.read().expect("records lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 核心原子操作：對單一 (SKU, 倉位) 套用增減量
    ///
    /// 結果為負時以 [`StockError::InsufficientStock`] 拒絕；
    /// 首次正向異動會延遲建立主檔，負向異動找不到 SKU 則回報不存在。
    pub fn apply_delta(
        &self,
        sku: &str,
        location: &LocationId,
        delta: i64,
    ) -> Result<InventoryRecord> {
        if !self.locations.contains(location) {
            return Err(StockError::UnknownLocation(location.to_string()));
        }

        let cell = if delta >= 0 {
            self.entry(sku)
        } else {
            let records = self.records.read().expect("records lock poisoned");
            records
                .get(sku)
                .cloned()
                .ok_or_else(|| StockError::SkuNotFound(sku.to_string()))?
        };

        let mut record = cell.lock().expect("record lock poisoned");
        record.apply_delta(location, delta)?;
        tracing::debug!(
            "套用庫存增減: sku={} location={} delta={} total={}",
            sku,
            location,
            delta,
            record.total
        );
        Ok(record.clone())
    }

    /// 管理性覆寫某倉位數量
    ///
    /// 只能作為同時寫入流水帳的上層操作的原語使用，
    /// 不可暴露為獨立的「設定庫存」操作。
    pub fn set_location_quantity(
        &self,
        sku: &str,
        location: &LocationId,
        quantity: i64,
    ) -> Result<InventoryRecord> {
        if !self.locations.contains(location) {
            return Err(StockError::UnknownLocation(location.to_string()));
        }

        let cell = self.entry(sku);
        let mut record = cell.lock().expect("record lock poisoned");
        record.set_quantity(location, quantity)?;
        Ok(record.clone())
    }

    /// 取得或建立主檔單元
    fn entry(&self, sku: &str) -> Arc<Mutex<InventoryRecord>> {
        {
            let records = self.records.read().expect("records lock poisoned");
            if let Some(cell) = records.get(sku) {
                return cell.clone();
            }
        }

        let mut records = self.records.write().expect("records lock poisoned");
        records
            .entry(sku.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(InventoryRecord::new(sku, &self.locations)))
            })
            .clone()
    }
}
