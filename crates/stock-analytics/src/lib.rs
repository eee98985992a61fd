//! # Stock Analytics
//!
//! 異動歷史的視窗化熱度分析

pub mod popularity;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stock_core::LocationId;

// Re-export 主要類型
pub use popularity::PopularityAnalyzer;

/// 趨勢分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// 出庫量明顯大於入庫量
    Up,
    /// 入庫量明顯大於出庫量
    Down,
    Stable,
}

/// 庫存健康分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockHealth {
    /// 現貨為零
    Critical,
    /// 現貨偏低
    Low,
    /// 現貨遠超出視窗內的出庫量
    Excess,
    Good,
}

/// 單一 SKU 的熱度分析結果（每次請求重算，不持久化）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityRecord {
    pub sku: String,
    pub name: Option<String>,

    /// 視窗內異動總筆數
    pub total_movements: u64,
    pub in_movements: u64,
    pub out_movements: u64,
    pub quantity_in: i64,
    pub quantity_out: i64,

    /// 現有總庫存
    pub current_stock: i64,

    /// 週轉率 = 出庫量 / max(現貨, 1)
    pub turnover_rate: Decimal,

    /// 熱度分數
    pub popularity_score: Decimal,

    /// 排名（依分數由高到低，1 起算）
    pub rank: usize,

    pub trend: Trend,
    pub stock_health: StockHealth,

    /// 建議行動
    pub recommendations: Vec<String>,
}

/// 異動類別彙總
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRollup {
    pub category: String,
    pub movements: u64,
    pub quantity_in: i64,
    pub quantity_out: i64,
}

/// 報表摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_movements: u64,
    pub skus_analyzed: usize,
    pub critical_count: usize,
    pub low_count: usize,
    pub excess_count: usize,
    pub trending_up: usize,
    pub trending_down: usize,
}

/// 熱度分析報表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityReport {
    pub window_days: u32,
    pub location: Option<LocationId>,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,

    /// 依熱度排名的完整清單
    pub products: Vec<PopularityRecord>,

    /// 異動類別彙總
    pub categories: Vec<CategoryRollup>,
}
