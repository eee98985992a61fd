//! 熱度分析器
//!
//! 對流水帳做視窗化的批次計算：逐 SKU 累計異動、評分、分類
//! 趨勢與庫存健康，最後排名。純讀取與計算，無副作用，
//! 可以重複與併發執行。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rayon::prelude::*;
use rust_decimal::Decimal;
use stock_core::{movement::is_transfer_reason, InventoryRecord, LocationId, MovementKind};
use stock_store::{InventoryStore, MovementLedger, MovementQuery};

use crate::{
    CategoryRollup, PopularityRecord, PopularityReport, ReportSummary, StockHealth, Trend,
};

/// 熱度分數權重：0.3×總異動 + 0.4×出庫筆數 + 0.3×週轉率
fn weight_movements() -> Decimal {
    Decimal::new(3, 1)
}

fn weight_out() -> Decimal {
    Decimal::new(4, 1)
}

fn weight_turnover() -> Decimal {
    Decimal::new(3, 1)
}

/// 趨勢判定的比例門檻（1.2 倍）
fn trend_ratio() -> Decimal {
    Decimal::new(12, 1)
}

/// 低庫存健康門檻
const HEALTH_LOW_THRESHOLD: i64 = 5;

/// 過剩判定：現貨超過視窗內出庫量的 3 倍
const HEALTH_EXCESS_MULTIPLIER: i64 = 3;

/// 轉倉建議所需的最低熱度分數
fn transfer_hint_min_score() -> Decimal {
    Decimal::from(5)
}

/// 視窗內單一 SKU 的異動累計
#[derive(Debug, Clone, Copy, Default)]
struct MovementTally {
    in_movements: u64,
    out_movements: u64,
    quantity_in: i64,
    quantity_out: i64,
}

impl MovementTally {
    fn total(&self) -> u64 {
        self.in_movements + self.out_movements
    }
}

/// 熱度分析器
pub struct PopularityAnalyzer {
    store: Arc<InventoryStore>,
    ledger: Arc<MovementLedger>,
}

impl PopularityAnalyzer {
    /// 創建新的分析器
    pub fn new(store: Arc<InventoryStore>, ledger: Arc<MovementLedger>) -> Self {
        Self { store, ledger }
    }

    /// 執行視窗化分析
    pub fn analyze(&self, window_days: u32, location: Option<&LocationId>) -> PopularityReport {
        tracing::info!(
            "開始熱度分析: 視窗 {} 天, 倉位 {:?}",
            window_days,
            location.map(|l| l.as_str())
        );

        let since = Utc::now() - Duration::days(i64::from(window_days));
        let mut query = MovementQuery::default().with_since(since);
        if let Some(location) = location {
            query = query.with_location(location.clone());
        }
        let movements = self.ledger.query(&query);

        // Step 1: 逐 SKU 累計視窗內異動
        let mut tallies: HashMap<String, MovementTally> = HashMap::new();
        for movement in &movements {
            let tally = tallies.entry(movement.sku.clone()).or_default();
            match movement.kind {
                MovementKind::In => {
                    tally.in_movements += 1;
                    tally.quantity_in += movement.quantity;
                }
                MovementKind::Out => {
                    tally.out_movements += 1;
                    tally.quantity_out += movement.quantity;
                }
            }
        }

        // Step 2: 對儲存已知的每個 SKU 評分（不限於視窗內有異動者）
        let records = self.store.list();
        let mut products: Vec<PopularityRecord> = records
            .par_iter()
            .map(|record| {
                let tally = tallies.get(&record.sku).copied().unwrap_or_default();
                score_record(record, &tally)
            })
            .collect();

        // Step 3: 依分數由高到低排序，同分以 SKU 升冪穩定決勝
        products.sort_by(|a, b| {
            b.popularity_score
                .cmp(&a.popularity_score)
                .then_with(|| a.sku.cmp(&b.sku))
        });
        for (index, product) in products.iter_mut().enumerate() {
            product.rank = index + 1;
        }

        let summary = ReportSummary {
            total_movements: movements.len() as u64,
            skus_analyzed: products.len(),
            critical_count: products
                .iter()
                .filter(|p| p.stock_health == StockHealth::Critical)
                .count(),
            low_count: products
                .iter()
                .filter(|p| p.stock_health == StockHealth::Low)
                .count(),
            excess_count: products
                .iter()
                .filter(|p| p.stock_health == StockHealth::Excess)
                .count(),
            trending_up: products.iter().filter(|p| p.trend == Trend::Up).count(),
            trending_down: products.iter().filter(|p| p.trend == Trend::Down).count(),
        };

        let categories = rollup_categories(&movements);

        tracing::info!(
            "熱度分析完成: {} SKU, {} 異動",
            summary.skus_analyzed,
            summary.total_movements
        );

        PopularityReport {
            window_days,
            location: location.cloned(),
            generated_at: Utc::now(),
            summary,
            products,
            categories,
        }
    }
}

/// 單一 SKU 的評分與分類
fn score_record(record: &InventoryRecord, tally: &MovementTally) -> PopularityRecord {
    let current_stock = record.total;

    // 週轉率 = 出庫量 / max(現貨, 1)
    let turnover_rate =
        Decimal::from(tally.quantity_out) / Decimal::from(current_stock.max(1));

    let popularity_score = weight_movements() * Decimal::from(tally.total())
        + weight_out() * Decimal::from(tally.out_movements)
        + weight_turnover() * turnover_rate;

    let trend = classify_trend(tally);
    let stock_health = classify_health(current_stock, tally);
    let recommendations =
        derive_recommendations(record, trend, stock_health, popularity_score);

    PopularityRecord {
        sku: record.sku.clone(),
        name: record.name.clone(),
        total_movements: tally.total(),
        in_movements: tally.in_movements,
        out_movements: tally.out_movements,
        quantity_in: tally.quantity_in,
        quantity_out: tally.quantity_out,
        current_stock,
        turnover_rate,
        popularity_score,
        rank: 0, // 排序後指派
        trend,
        stock_health,
        recommendations,
    }
}

/// 趨勢：出庫量 > 1.2×入庫量為 up，反之為 down
fn classify_trend(tally: &MovementTally) -> Trend {
    let quantity_in = Decimal::from(tally.quantity_in);
    let quantity_out = Decimal::from(tally.quantity_out);

    if quantity_out > trend_ratio() * quantity_in {
        Trend::Up
    } else if quantity_in > trend_ratio() * quantity_out {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// 庫存健康：critical（零）優先於 low，low 優先於 excess
fn classify_health(current_stock: i64, tally: &MovementTally) -> StockHealth {
    if current_stock == 0 {
        StockHealth::Critical
    } else if current_stock <= HEALTH_LOW_THRESHOLD {
        StockHealth::Low
    } else if current_stock > HEALTH_EXCESS_MULTIPLIER * tally.quantity_out {
        StockHealth::Excess
    } else {
        StockHealth::Good
    }
}

/// 由趨勢 × 健康組合推導建議
fn derive_recommendations(
    record: &InventoryRecord,
    trend: Trend,
    health: StockHealth,
    score: Decimal,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    match health {
        StockHealth::Critical => {
            recommendations.push(format!(
                "restock now (suggested minimum {})",
                minimum_stock_target(record.total)
            ));
        }
        StockHealth::Low => {
            recommendations.push(format!(
                "restock soon (suggested minimum {})",
                minimum_stock_target(record.total)
            ));
        }
        StockHealth::Excess if trend == Trend::Down => {
            recommendations.push("consider discount or redistribution".to_string());
        }
        _ => {}
    }

    // 單邊庫存 + 有意義的熱度 → 建議倉位間調撥
    if record.total > 0 && score >= transfer_hint_min_score() {
        let empty: Vec<_> = record
            .quantities
            .iter()
            .filter(|(_, qty)| **qty == 0)
            .map(|(location, _)| location.clone())
            .collect();
        if !empty.is_empty() {
            if let Some((source, _)) = record
                .quantities
                .iter()
                .max_by_key(|(_, qty)| **qty)
            {
                for target in empty {
                    recommendations.push(format!(
                        "consider transferring stock from {} to {}",
                        source, target
                    ));
                }
            }
        }
    }

    recommendations
}

/// 補貨目標的歷史啟發值：max(5, 現貨 + 3)
///
/// 沿用舊系統行為以保持相容；目標恆高於現貨的特性是否符合
/// 業務意圖仍待確認。
fn minimum_stock_target(current_stock: i64) -> i64 {
    (current_stock + 3).max(5)
}

/// 依異動 reason 的類別彙總
fn rollup_categories(movements: &[stock_core::StockMovement]) -> Vec<CategoryRollup> {
    let mut rollups: HashMap<String, CategoryRollup> = HashMap::new();

    for movement in movements {
        let category = category_of(&movement.reason);
        let rollup = rollups
            .entry(category.clone())
            .or_insert_with(|| CategoryRollup {
                category,
                movements: 0,
                quantity_in: 0,
                quantity_out: 0,
            });
        rollup.movements += 1;
        match movement.kind {
            MovementKind::In => rollup.quantity_in += movement.quantity,
            MovementKind::Out => rollup.quantity_out += movement.quantity,
        }
    }

    let mut result: Vec<CategoryRollup> = rollups.into_values().collect();
    result.sort_by(|a, b| b.movements.cmp(&a.movements).then_with(|| a.category.cmp(&b.category)));
    result
}

/// 自由文字 reason 的類別正規化
fn category_of(reason: &str) -> String {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return "uncategorized".to_string();
    }
    if is_transfer_reason(trimmed) {
        return "transfer".to_string();
    }
    if trimmed.to_lowercase().starts_with("invoice") {
        return "invoice".to_string();
    }
    trimmed
        .split(':')
        .next()
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}
