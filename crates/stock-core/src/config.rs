//! 庫存子系統配置

use serde::{Deserialize, Serialize};

use crate::location::LocationSet;

/// 庫存子系統配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// 認可的倉位集合
    pub locations: LocationSet,

    /// 庫存快取存活時間（秒）
    pub cache_ttl_secs: u64,

    /// 批次查詢的分塊大小（限制併發扇出）
    pub fetch_batch_size: usize,

    /// 出貨閘道呼叫逾時（秒）
    pub shipment_timeout_secs: u64,

    /// 分析報表預設視窗（天）
    pub default_window_days: u32,

    /// 分析報表回傳的排名數量
    pub analytics_top_n: usize,
}

impl StockConfig {
    /// 創建新的配置（其餘欄位使用預設值）
    pub fn new(locations: LocationSet) -> Self {
        Self {
            locations,
            cache_ttl_secs: 300, // 預設 5 分鐘
            fetch_batch_size: 25,
            shipment_timeout_secs: 10,
            default_window_days: 30,
            analytics_top_n: 10,
        }
    }

    /// 建構器模式：設置快取存活時間
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// 建構器模式：設置批次分塊大小
    pub fn with_fetch_batch_size(mut self, size: usize) -> Self {
        self.fetch_batch_size = size.max(1);
        self
    }

    /// 建構器模式：設置排名數量
    pub fn with_analytics_top_n(mut self, top_n: usize) -> Self {
        self.analytics_top_n = top_n.max(1);
        self
    }
}

impl Default for StockConfig {
    fn default() -> Self {
        Self::new(LocationSet::default_pair())
    }
}
