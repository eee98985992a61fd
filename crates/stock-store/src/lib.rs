//! # Stock Store
//!
//! 庫存計數器與異動流水帳：當下庫存的唯一權威來源

pub mod inventory;
pub mod ledger;
pub mod posting;

// Re-export 主要類型
pub use inventory::InventoryStore;
pub use ledger::{MovementLedger, MovementQuery};
pub use posting::{post_correction, post_movement};
