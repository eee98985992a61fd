//! 異動流水帳端點

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stock_core::{MovementKind, NewMovement, ProductStock, StockError, StockMovement};
use stock_store::{post_movement, MovementQuery};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `GET /movements` 查詢參數
#[derive(Debug, Default, Deserialize)]
pub struct MovementListQuery {
    pub sku: Option<String>,
    pub location: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /movements`
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementListQuery>,
) -> ApiResult<Json<Vec<StockMovement>>> {
    let mut ledger_query = MovementQuery::default().with_limit(query.limit.unwrap_or(50));

    if let Some(sku) = query.sku {
        ledger_query = ledger_query.with_sku(sku);
    }
    if let Some(raw) = &query.location {
        ledger_query = ledger_query.with_location(state.config.locations.resolve(raw)?);
    }
    if let Some(since) = &query.since {
        ledger_query = ledger_query.with_since(parse_timestamp(since)?);
    }
    if let Some(until) = &query.until {
        ledger_query = ledger_query.with_until(parse_timestamp(until)?);
    }

    Ok(Json(state.ledger.query(&ledger_query)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    raw.parse::<DateTime<Utc>>().map_err(|_| {
        ApiError(StockError::Validation(format!(
            "無效的時間格式 (需要 RFC 3339): {}",
            raw
        )))
    })
}

/// `POST /movements` 請求主體
#[derive(Debug, Deserialize)]
pub struct CreateMovementRequest {
    pub sku: String,
    #[serde(alias = "movementType")]
    pub movement_type: MovementKind,
    pub quantity: i64,
    pub location: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

/// 異動入帳回應：帳目 + 更新後的庫存摘要
#[derive(Debug, Serialize)]
pub struct CreateMovementResponse {
    pub movement: StockMovement,
    pub stock: ProductStock,
}

/// `POST /movements` — 入帳一筆異動並套用對應的庫存增減
pub async fn create_movement(
    State(state): State<AppState>,
    Json(request): Json<CreateMovementRequest>,
) -> ApiResult<Json<CreateMovementResponse>> {
    let location = state.config.locations.resolve(&request.location)?;

    let movement = NewMovement::new(
        &request.sku,
        request.movement_type,
        request.quantity,
        location,
    )
    .with_reason(request.reason.unwrap_or_default())
    .with_actor(request.user_id.as_deref().unwrap_or("system"));

    let (stored, record) = post_movement(&state.store, &state.ledger, movement)?;
    state.cache.invalidate(Some(&request.sku));

    Ok(Json(CreateMovementResponse {
        movement: stored,
        stock: ProductStock::from_record(&record),
    }))
}
