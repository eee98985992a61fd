//! # Stock API
//!
//! 庫存子系統的 HTTP 介面（JSON 請求/回應）
//!
//! 快取、儲存與協調器由組合根建立後注入 [`AppState`]，
//! 這裡不持有任何全域單例。

pub mod analytics;
pub mod error;
pub mod inventory;
pub mod invoices;
pub mod movements;
pub mod transfers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use stock_analytics::PopularityAnalyzer;
use stock_cache::StockCache;
use stock_core::StockConfig;
use stock_store::{InventoryStore, MovementLedger};
use stock_transfer::TransferCoordinator;

pub use error::{ApiError, ApiResult};

/// 各端點共用的應用狀態
#[derive(Clone)]
pub struct AppState {
    pub config: StockConfig,
    pub store: Arc<InventoryStore>,
    pub ledger: Arc<MovementLedger>,
    pub cache: Arc<StockCache>,
    pub coordinator: Arc<TransferCoordinator>,
    pub analyzer: Arc<PopularityAnalyzer>,
}

/// 組裝路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/inventory",
            get(inventory::list_inventory).put(inventory::update_inventory),
        )
        .route(
            "/movements",
            get(movements::list_movements).post(movements::create_movement),
        )
        .route(
            "/transfers",
            post(transfers::create_transfer).get(transfers::list_transfers),
        )
        .route("/invoices/confirm", post(invoices::confirm_invoice))
        .route("/analytics", get(analytics::analytics_report))
        .route("/health", get(health))
        .with_state(state)
}

/// 健康檢查
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use stock_core::{LocationId, LocationSet};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = StockConfig::new(LocationSet::default_pair());
        let store = Arc::new(InventoryStore::new(config.locations.clone()));
        let ledger = Arc::new(MovementLedger::new());
        let cache = Arc::new(StockCache::new(
            store.clone(),
            config.cache_ttl_secs,
            config.fetch_batch_size,
        ));
        let coordinator = Arc::new(TransferCoordinator::new(
            store.clone(),
            ledger.clone(),
            cache.clone(),
        ));
        let analyzer = Arc::new(PopularityAnalyzer::new(store.clone(), ledger.clone()));

        AppState {
            config,
            store,
            ledger,
            cache,
            coordinator,
            analyzer,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_post_movement_updates_stock() {
        let state = test_state();
        let app = router(state.clone());

        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/movements",
                json!({
                    "sku": "TRI-2041-NAV",
                    "movement_type": "in",
                    "quantity": 5,
                    "location": "chodov",
                    "reason": "goods receipt",
                    "user_id": "tester"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stock"]["total"], 5);
        assert_eq!(body["movement"]["kind"], "in");
        assert_eq!(state.store.get("TRI-2041-NAV").unwrap().total, 5);
    }

    #[tokio::test]
    async fn test_post_movement_insufficient_stock_conflict() {
        let state = test_state();
        state
            .store
            .apply_delta("X", &LocationId::new("chodov"), 2)
            .unwrap();
        let app = router(state);

        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/movements",
                json!({
                    "sku": "X",
                    "movement_type": "out",
                    "quantity": 5,
                    "location": "chodov"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "insufficient_stock");
    }

    #[tokio::test]
    async fn test_transfer_endpoint_partial_success() {
        let state = test_state();
        state
            .store
            .apply_delta("X", &LocationId::new("chodov"), 10)
            .unwrap();
        let app = router(state);

        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/transfers",
                json!({
                    "items": [
                        {"sku": "X", "quantity": 5},
                        {"sku": "GHOST", "quantity": 2}
                    ],
                    "from_location": "chodov",
                    "to_location": "outlet"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transferred"].as_array().unwrap().len(), 1);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(body["total_quantity"], 5);
        assert_eq!(body["shipment"]["status"], "not_requested");
    }

    #[tokio::test]
    async fn test_transfer_same_location_rejected() {
        let state = test_state();
        let app = router(state);

        let (status, _body) = send(
            app,
            json_request(
                "POST",
                "/transfers",
                json!({
                    "items": [{"sku": "X", "quantity": 1}],
                    "from_location": "chodov",
                    "to_location": "chodov"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_inventory_logs_manual_adjustment() {
        let state = test_state();
        let app = router(state.clone());

        let (status, body) = send(
            app,
            json_request(
                "PUT",
                "/inventory",
                json!({
                    "sku": "X",
                    "stocks": {"chodov": 8},
                    "user_id": "admin"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stock"]["total"], 8);
        assert_eq!(body["movements"][0]["reason"], "manual adjustment");
        assert_eq!(state.ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_put_inventory_unknown_location_applies_nothing() {
        let state = test_state();
        let chodov = LocationId::new("chodov");
        state.store.apply_delta("X", &chodov, 1).unwrap();
        // 暖快取，確認失敗的請求不會讓它與儲存脫節
        assert_eq!(state.cache.get_one("X").total, 1);
        let app = router(state.clone());

        let (status, body) = send(
            app,
            json_request(
                "PUT",
                "/inventory",
                json!({
                    "sku": "X",
                    "stocks": {"chodov": 5, "warehouse-9": 7}
                }),
            ),
        )
        .await;

        // 任一倉位未知 → 整筆拒絕，無任何副作用
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "unknown_location");
        assert_eq!(state.store.get("X").unwrap().total, 1);
        assert!(state.ledger.is_empty());
        assert_eq!(state.cache.get_one("X").total, 1);
    }

    #[tokio::test]
    async fn test_invoice_confirm_accumulates_errors() {
        let state = test_state();
        let app = router(state);

        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/invoices/confirm",
                json!({
                    "invoiceNumber": "2024-117",
                    "items": [
                        {"sku": "A", "quantity": 3},
                        {"sku": "B", "quantity": 0}
                    ],
                    "location": "outlet"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["received"].as_array().unwrap().len(), 1);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(body["total_quantity"], 3);
    }

    #[tokio::test]
    async fn test_inventory_listing_with_filters() {
        let state = test_state();
        let chodov = LocationId::new("chodov");
        state.store.apply_delta("AAA-1", &chodov, 2).unwrap();
        state.store.apply_delta("BBB-2", &chodov, 50).unwrap();
        let app = router(state);

        let (status, body) = send(
            app,
            Request::builder()
                .uri("/inventory?stockFilter=low-stock")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["sku"], "AAA-1");
        assert_eq!(items[0]["priority"], 1);
    }

    #[tokio::test]
    async fn test_analytics_endpoint() {
        let state = test_state();
        state
            .store
            .apply_delta("Z", &LocationId::new("chodov"), 10)
            .unwrap();
        let app = router(state);

        let (status, body) = send(
            app,
            Request::builder()
                .uri("/analytics?days=30&top=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["window_days"], 30);
        assert_eq!(body["summary"]["skus_analyzed"], 1);
    }

    #[tokio::test]
    async fn test_unknown_location_rejected() {
        let state = test_state();
        let app = router(state);

        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/movements",
                json!({
                    "sku": "X",
                    "movement_type": "in",
                    "quantity": 1,
                    "location": "warehouse-9"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "unknown_location");
    }
}
