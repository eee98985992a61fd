//! 讀穿式庫存快取
//!
//! 商品頁與列表的高頻讀取走這裡；寫入路徑一律直達
//! [`InventoryStore`]，寫入後由呼叫端明確呼叫 `invalidate`。
//! 快取實例由組合根建立並注入，不是全域單例。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use stock_core::{ProductStock, StockError};
use stock_store::InventoryStore;

/// 舊系統庫存來源
///
/// SKU 完全不在 [`InventoryStore`] 時的次要查詢來源，
/// 查無結果才視為零庫存。
pub trait LegacyStockSource: Send + Sync {
    fn fetch(&self, sku: &str) -> Option<ProductStock>;
}

/// 每 SKU TTL 的讀穿式快取
pub struct StockCache {
    store: Arc<InventoryStore>,
    legacy: Option<Arc<dyn LegacyStockSource>>,

    /// 快取存活時間
    ttl: Duration,

    /// 批次查詢分塊大小（限制扇出）
    batch_size: usize,

    entries: RwLock<HashMap<String, ProductStock>>,
}

impl StockCache {
    /// 創建新的快取（TTL 秒數、分塊大小）
    pub fn new(store: Arc<InventoryStore>, ttl_secs: u64, batch_size: usize) -> Self {
        Self {
            store,
            legacy: None,
            ttl: Duration::seconds(ttl_secs as i64),
            batch_size: batch_size.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 建構器模式：設置舊系統庫存來源
    pub fn with_legacy_source(mut self, legacy: Arc<dyn LegacyStockSource>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// 讀取單一 SKU 的庫存快照
    ///
    /// 快取新鮮則直接回傳；否則從儲存重建。讀取失敗時降級為
    /// 保守的零庫存快照，庫存顯示絕不讓整個請求失敗。
    pub fn get_one(&self, sku: &str) -> ProductStock {
        if let Some(fresh) = self.fresh_entry(sku) {
            return fresh;
        }

        let stock = self.rebuild(sku);
        self.store_entry(stock.clone());
        stock
    }

    /// 批次讀取；未命中的 SKU 以固定分塊向儲存補查
    pub fn get_many(&self, skus: &[String]) -> HashMap<String, ProductStock> {
        let mut result = HashMap::new();
        let mut misses = Vec::new();

        for sku in skus {
            match self.fresh_entry(sku) {
                Some(stock) => {
                    result.insert(sku.clone(), stock);
                }
                None => misses.push(sku.clone()),
            }
        }

        for chunk in misses.chunks(self.batch_size) {
            let records = self.store.get_batch(chunk);
            for sku in chunk {
                let stock = match records.get(sku) {
                    Some(record) => ProductStock::from_record(record),
                    None => self.fallback(sku),
                };
                self.store_entry(stock.clone());
                result.insert(sku.clone(), stock);
            }
        }

        result
    }

    /// 失效單一 SKU 或整個快取
    ///
    /// 快取沒有訂閱機制，任何觸及 SKU 的寫入後都必須呼叫。
    pub fn invalidate(&self, sku: Option<&str>) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        match sku {
            Some(sku) => {
                entries.remove(sku);
            }
            None => entries.clear(),
        }
    }

    /// 目前快取的項目數
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fresh_entry(&self, sku: &str) -> Option<ProductStock> {
        let entries = self.entries.read().expect("cache lock poisoned");
        entries
            .get(sku)
            .filter(|stock| Utc::now() - stock.fetched_at < self.ttl)
            .cloned()
    }

    fn store_entry(&self, stock: ProductStock) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(stock.sku.clone(), stock);
    }

    fn rebuild(&self, sku: &str) -> ProductStock {
        match self.store.get(sku) {
            Ok(record) => ProductStock::from_record(&record),
            Err(StockError::SkuNotFound(_)) => self.fallback(sku),
            Err(err) => {
                tracing::warn!("庫存讀取失敗，降級為零庫存: sku={} err={}", sku, err);
                ProductStock::zero(sku)
            }
        }
    }

    fn fallback(&self, sku: &str) -> ProductStock {
        if let Some(legacy) = &self.legacy {
            if let Some(stock) = legacy.fetch(sku) {
                tracing::debug!("SKU 由舊系統來源補上: {}", sku);
                return stock;
            }
        }
        ProductStock::zero(sku)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_core::{LocationId, LocationSet};

    fn store_with(sku: &str, qty: i64) -> Arc<InventoryStore> {
        let store = Arc::new(InventoryStore::new(LocationSet::default_pair()));
        if qty > 0 {
            store
                .apply_delta(sku, &LocationId::new("chodov"), qty)
                .unwrap();
        }
        store
    }

    struct FixedLegacy(i64);

    impl LegacyStockSource for FixedLegacy {
        fn fetch(&self, sku: &str) -> Option<ProductStock> {
            let mut stock = ProductStock::zero(sku);
            stock.total = self.0;
            stock.available = self.0 > 0;
            Some(stock)
        }
    }

    #[test]
    fn test_read_through_and_hit() {
        let store = store_with("X", 7);
        let cache = StockCache::new(store.clone(), 300, 25);

        let first = cache.get_one("X");
        assert_eq!(first.total, 7);
        assert_eq!(cache.len(), 1);

        // 寫入不經快取，未失效前讀到的是舊值（TTL 內可接受）
        store
            .apply_delta("X", &LocationId::new("chodov"), 5)
            .unwrap();
        assert_eq!(cache.get_one("X").total, 7);

        cache.invalidate(Some("X"));
        assert_eq!(cache.get_one("X").total, 12);
    }

    #[test]
    fn test_expired_entry_is_rebuilt() {
        let store = store_with("X", 3);
        let cache = StockCache::new(store.clone(), 0, 25); // TTL 0 = 立即過期

        assert_eq!(cache.get_one("X").total, 3);
        store
            .apply_delta("X", &LocationId::new("chodov"), 1)
            .unwrap();
        assert_eq!(cache.get_one("X").total, 4);
    }

    #[test]
    fn test_unknown_sku_degrades_to_zero() {
        let cache = StockCache::new(store_with("X", 1), 300, 25);
        let stock = cache.get_one("GHOST");
        assert_eq!(stock.total, 0);
        assert!(!stock.available);
    }

    #[test]
    fn test_legacy_fallback_before_zero() {
        let cache =
            StockCache::new(store_with("X", 1), 300, 25).with_legacy_source(Arc::new(FixedLegacy(6)));

        let stock = cache.get_one("OLD-SKU");
        assert_eq!(stock.total, 6);
        assert!(stock.available);
    }

    #[test]
    fn test_get_many_batches_misses() {
        let store = Arc::new(InventoryStore::new(LocationSet::default_pair()));
        for i in 0..7 {
            store
                .apply_delta(&format!("SKU-{}", i), &LocationId::new("outlet"), i + 1)
                .unwrap();
        }
        let cache = StockCache::new(store, 300, 3); // 每塊 3 筆

        let skus: Vec<String> = (0..7).map(|i| format!("SKU-{}", i)).collect();
        let result = cache.get_many(&skus);

        assert_eq!(result.len(), 7);
        assert_eq!(result["SKU-6"].total, 7);
        assert_eq!(cache.len(), 7);
    }

    #[test]
    fn test_invalidate_all() {
        let cache = StockCache::new(store_with("X", 2), 300, 25);
        cache.get_one("X");
        assert_eq!(cache.len(), 1);
        cache.invalidate(None);
        assert!(cache.is_empty());
    }
}
