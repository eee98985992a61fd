//! 異動流水帳
//!
//! 只增不改的事件日誌：沒有更新與刪除操作，
//! 修正一律以新的補償異動入帳。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use stock_core::{LocationId, NewMovement, Result, StockMovement};

/// 流水帳查詢條件
#[derive(Debug, Clone, Default)]
pub struct MovementQuery {
    pub sku: Option<String>,
    pub location: Option<LocationId>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl MovementQuery {
    /// 建構器模式：篩選 SKU
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// 建構器模式：篩選倉位
    pub fn with_location(mut self, location: LocationId) -> Self {
        self.location = Some(location);
        self
    }

    /// 建構器模式：起始時間（含）
    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// 建構器模式：結束時間（含）
    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// 建構器模式：筆數上限
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, movement: &StockMovement) -> bool {
        if let Some(sku) = &self.sku {
            if &movement.sku != sku {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if &movement.location != location {
                return false;
            }
        }
        if let Some(since) = self.since {
            if movement.occurred_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if movement.occurred_at > until {
                return false;
            }
        }
        true
    }
}

/// 只增不改的庫存異動流水帳
pub struct MovementLedger {
    /// 依入帳順序存放（id 遞增）
    movements: Mutex<Vec<StockMovement>>,

    /// 下一個流水號
    next_id: AtomicU64,
}

impl MovementLedger {
    /// 創建新的流水帳
    pub fn new() -> Self {
        Self {
            movements: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// 入帳一筆異動：指派流水號與時間戳，存放後即不可變
    ///
    /// 只有格式錯誤（非正數量、空 SKU）會失敗。
    pub fn append(&self, movement: NewMovement) -> Result<StockMovement> {
        movement.validate()?;

        let stored = StockMovement {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            sku: movement.sku,
            kind: movement.kind,
            quantity: movement.quantity,
            location: movement.location,
            reason: movement.reason,
            actor: movement.actor,
            occurred_at: Utc::now(),
        };

        let mut movements = self.movements.lock().expect("ledger lock poisoned");
        movements.push(stored.clone());

        tracing::debug!(
            "入帳庫存異動: id={} sku={} kind={} qty={} location={}",
            stored.id,
            stored.sku,
            stored.kind,
            stored.quantity,
            stored.location
        );

        Ok(stored)
    }

    /// 查詢異動，預設由新到舊
    pub fn query(&self, query: &MovementQuery) -> Vec<StockMovement> {
        let movements = self.movements.lock().expect("ledger lock poisoned");
        let mut result: Vec<StockMovement> = movements
            .iter()
            .rev()
            .filter(|m| query.matches(m))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        // 同批入帳的時間戳可能相同，以流水號保證新到舊
        result.sort_by(|a, b| b.id.cmp(&a.id));
        result
    }

    /// 流水帳總筆數
    pub fn len(&self) -> usize {
        self.movements.lock().expect("ledger lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MovementLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_core::MovementKind;

    fn inbound(sku: &str, qty: i64, location: &str) -> NewMovement {
        NewMovement::new(sku, MovementKind::In, qty, LocationId::new(location))
            .with_reason("goods receipt")
            .with_actor("tester")
    }

    #[test]
    fn test_append_assigns_monotonic_ids() {
        let ledger = MovementLedger::new();
        let first = ledger.append(inbound("A", 1, "chodov")).unwrap();
        let second = ledger.append(inbound("B", 2, "outlet")).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_append_rejects_malformed_input() {
        let ledger = MovementLedger::new();
        assert!(ledger.append(inbound("A", 0, "chodov")).is_err());
        assert!(ledger.append(inbound("", 1, "chodov")).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_query_newest_first() {
        let ledger = MovementLedger::new();
        ledger.append(inbound("A", 1, "chodov")).unwrap();
        ledger.append(inbound("A", 2, "chodov")).unwrap();
        ledger.append(inbound("A", 3, "chodov")).unwrap();

        let result = ledger.query(&MovementQuery::default());
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].quantity, 3);
        assert_eq!(result[2].quantity, 1);
    }

    #[test]
    fn test_query_filters() {
        let ledger = MovementLedger::new();
        ledger.append(inbound("A", 1, "chodov")).unwrap();
        ledger.append(inbound("B", 2, "outlet")).unwrap();
        ledger.append(inbound("A", 3, "outlet")).unwrap();

        let by_sku = ledger.query(&MovementQuery::default().with_sku("A"));
        assert_eq!(by_sku.len(), 2);

        let by_location =
            ledger.query(&MovementQuery::default().with_location(LocationId::new("outlet")));
        assert_eq!(by_location.len(), 2);

        let limited = ledger.query(&MovementQuery::default().with_limit(1));
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].quantity, 3);
    }

    #[test]
    fn test_time_window_filter() {
        let ledger = MovementLedger::new();
        ledger.append(inbound("A", 1, "chodov")).unwrap();

        let future = Utc::now() + chrono::Duration::hours(1);
        let none = ledger.query(&MovementQuery::default().with_since(future));
        assert!(none.is_empty());

        let all = ledger.query(
            &MovementQuery::default()
                .with_since(Utc::now() - chrono::Duration::hours(1))
                .with_until(future),
        );
        assert_eq!(all.len(), 1);
    }
}
