//! # Stock Cache
//!
//! 高頻讀取路徑的時限快取模組

pub mod read_through;

// Re-export 主要類型
pub use read_through::{LegacyStockSource, StockCache};
