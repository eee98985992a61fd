//! 庫存服務進入點
//!
//! 組合根：在這裡建立儲存、流水帳、快取、協調器與分析器，
//! 並注入 HTTP 層。環境變數：
//! - `PORT`: HTTP 埠號（預設 8080）
//! - `STOCK_LOCATIONS`: 逗號分隔的倉位清單（預設 "chodov,outlet"）

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use stock_analytics::PopularityAnalyzer;
use stock_api::AppState;
use stock_cache::StockCache;
use stock_core::{LocationSet, StockConfig};
use stock_store::{InventoryStore, MovementLedger};
use stock_transfer::{InProcessGateway, TransferCoordinator};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let locations = match std::env::var("STOCK_LOCATIONS") {
        Ok(raw) => LocationSet::new(raw.split(',')).context("無效的 STOCK_LOCATIONS")?,
        Err(_) => LocationSet::default_pair(),
    };
    let config = StockConfig::new(locations);

    let store = Arc::new(InventoryStore::new(config.locations.clone()));
    let ledger = Arc::new(MovementLedger::new());
    let cache = Arc::new(StockCache::new(
        store.clone(),
        config.cache_ttl_secs,
        config.fetch_batch_size,
    ));
    let coordinator = Arc::new(
        TransferCoordinator::new(store.clone(), ledger.clone(), cache.clone())
            .with_gateway(Arc::new(InProcessGateway))
            .with_shipment_timeout(Duration::from_secs(config.shipment_timeout_secs)),
    );
    let analyzer = Arc::new(PopularityAnalyzer::new(store.clone(), ledger.clone()));

    let state = AppState {
        config,
        store,
        ledger,
        cache,
        coordinator,
        analyzer,
    };

    let app = stock_api::router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);
    info!("庫存服務啟動: {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("無法綁定 {}", addr))?;
    axum::serve(listener, app).await.context("服務中止")?;

    Ok(())
}
