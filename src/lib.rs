//! # Stock
//!
//! 庫存帳務與調撥子系統：每 SKU 每倉位的庫存計數器、
//! 只增不改的異動流水帳、倉位間調撥協調、庫存狀態推導
//! 與視窗化熱度分析。

pub use stock_analytics::{
    PopularityAnalyzer, PopularityRecord, PopularityReport, StockHealth, Trend,
};
pub use stock_cache::{LegacyStockSource, StockCache};
pub use stock_core::{
    InventoryRecord, LocationId, LocationSet, MovementKind, NewMovement, ProductStock,
    StockConfig, StockError, StockMovement, StockStatus, StockStatusKind,
};
pub use stock_store::{post_correction, post_movement, InventoryStore, MovementLedger, MovementQuery};
pub use stock_transfer::{
    ShipmentGateway, ShipmentOutcome, Transfer, TransferCoordinator, TransferLine, TransferResult,
};
