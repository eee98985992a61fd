//! # Stock Transfer
//!
//! 倉位間調撥的協調器與出貨閘道介面

pub mod coordinator;
pub mod shipment;

// Re-export 主要類型
pub use coordinator::{
    Transfer, TransferCoordinator, TransferErrorKind, TransferItemError, TransferLine,
    TransferResult,
};
pub use shipment::{
    InProcessGateway, ShipmentConfirmation, ShipmentGateway, ShipmentOutcome, ShipmentRequest,
};
