//! 熱度分析端點

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use stock_analytics::PopularityReport;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /analytics` 查詢參數
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<u32>,
    pub location: Option<String>,
    pub top: Option<usize>,
}

/// `GET /analytics` — 視窗化熱度報表（摘要 + 排名 + 類別彙總）
pub async fn analytics_report(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<PopularityReport>> {
    let location = match &query.location {
        Some(raw) => Some(state.config.locations.resolve(raw)?),
        None => None,
    };

    let window_days = query.days.unwrap_or(state.config.default_window_days);
    let top_n = query.top.unwrap_or(state.config.analytics_top_n);

    let mut report = state.analyzer.analyze(window_days, location.as_ref());
    report.products.truncate(top_n);

    Ok(Json(report))
}
