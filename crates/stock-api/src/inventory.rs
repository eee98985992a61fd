//! 庫存列表與管理性修正端點

use std::collections::{BTreeMap, HashMap};

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use stock_core::{sku::matches_search, status, ProductStock, StockMovement, StockStatus};
use stock_store::post_correction;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `GET /inventory` 查詢參數
#[derive(Debug, Default, Deserialize)]
pub struct InventoryListQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "stockFilter")]
    pub stock_filter: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "sortOrder")]
    pub sort_order: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// 列表單項
#[derive(Debug, Serialize)]
pub struct InventoryListItem {
    pub sku: String,
    pub name: Option<String>,
    pub current_stock: i64,
    pub per_location_stock: BTreeMap<String, i64>,
    pub status: StockStatus,
    pub priority: u8,
}

/// 列表回應
#[derive(Debug, Serialize)]
pub struct InventoryListResponse {
    pub items: Vec<InventoryListItem>,
    pub page: usize,
    pub limit: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// `GET /inventory`
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventoryListQuery>,
) -> ApiResult<Json<InventoryListResponse>> {
    let location_filter = match &query.location {
        Some(raw) => Some(state.config.locations.resolve(raw).map_err(ApiError)?),
        None => None,
    };

    let mut items: Vec<InventoryListItem> = state
        .store
        .list()
        .into_iter()
        .filter(|record| {
            query
                .search
                .as_deref()
                .map(|needle| matches_search(&record.sku, record.name.as_deref(), needle))
                .unwrap_or(true)
        })
        .filter(|record| {
            location_filter
                .as_ref()
                .map(|location| record.quantity(location) > 0)
                .unwrap_or(true)
        })
        .map(|record| {
            let stock = ProductStock::from_record(&record);
            let status = status::resolve(&stock);
            InventoryListItem {
                sku: record.sku.clone(),
                name: record.name.clone(),
                current_stock: record.total,
                per_location_stock: record
                    .quantities
                    .iter()
                    .map(|(location, qty)| (location.to_string(), *qty))
                    .collect(),
                priority: status.priority,
                status,
            }
        })
        .collect();

    if let Some(filter) = &query.stock_filter {
        let filter = filter.trim().to_lowercase();
        items.retain(|item| match filter.as_str() {
            "out-of-stock" => item.current_stock == 0,
            "low-stock" => item.priority == 1,
            "available-at-branch" => item.priority == 2,
            "in-stock" => item.priority == 3,
            _ => true,
        });
    }

    sort_items(&mut items, query.sort_by.as_deref(), query.sort_order.as_deref());

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(limit).max(1);
    let page = query.page.unwrap_or(1).max(1);

    let items = items
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Ok(Json(InventoryListResponse {
        items,
        page,
        limit,
        total_items,
        total_pages,
    }))
}

fn sort_items(items: &mut [InventoryListItem], sort_by: Option<&str>, sort_order: Option<&str>) {
    match sort_by.unwrap_or("sku") {
        "stock" => items.sort_by(|a, b| a.current_stock.cmp(&b.current_stock)),
        "name" => items.sort_by(|a, b| a.name.cmp(&b.name)),
        "priority" => items.sort_by(|a, b| a.priority.cmp(&b.priority)),
        _ => items.sort_by(|a, b| a.sku.cmp(&b.sku)),
    }

    if sort_order.unwrap_or("asc").eq_ignore_ascii_case("desc") {
        items.reverse();
    }
}

/// `PUT /inventory` 請求主體
///
/// 倉位以型別化的映射表達，不使用動態欄位名稱。
#[derive(Debug, Deserialize)]
pub struct InventoryUpdateRequest {
    pub sku: String,
    pub stocks: HashMap<String, i64>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

/// 修正回應
#[derive(Debug, Serialize)]
pub struct InventoryUpdateResponse {
    pub sku: String,
    pub stock: ProductStock,
    /// 本次修正入帳的異動（未變動的倉位不產生帳目）
    pub movements: Vec<StockMovement>,
}

/// `PUT /inventory` — 管理性修正，仍然逐倉位入帳
pub async fn update_inventory(
    State(state): State<AppState>,
    Json(request): Json<InventoryUpdateRequest>,
) -> ApiResult<Json<InventoryUpdateResponse>> {
    if request.sku.trim().is_empty() {
        return Err(ApiError(stock_core::StockError::Validation(
            "SKU 不可為空".to_string(),
        )));
    }
    if request.stocks.is_empty() {
        return Err(ApiError(stock_core::StockError::Validation(
            "至少需要一個倉位數量".to_string(),
        )));
    }

    // 先解析所有倉位再套用任何修正：部分倉位未知時整筆拒絕，
    // 不留下已套用一半的修正
    let mut corrections = Vec::with_capacity(request.stocks.len());
    for (raw_location, quantity) in &request.stocks {
        let location = state
            .config
            .locations
            .resolve(raw_location)
            .map_err(ApiError)?;
        corrections.push((location, *quantity));
    }

    let actor = request.user_id.as_deref().unwrap_or("admin");
    let mut movements = Vec::new();

    for (location, quantity) in corrections {
        if let Some((movement, _)) = post_correction(
            &state.store,
            &state.ledger,
            &request.sku,
            &location,
            quantity,
            actor,
        )
        .map_err(ApiError)?
        {
            movements.push(movement);
        }
    }

    state.cache.invalidate(Some(&request.sku));

    let record = state.store.get(&request.sku).map_err(ApiError)?;
    Ok(Json(InventoryUpdateResponse {
        sku: request.sku,
        stock: ProductStock::from_record(&record),
        movements,
    }))
}
