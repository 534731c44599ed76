use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trendwatch_core::{normalize_keyword, TrackedTrend};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct TrendItem {
    pub canonical_keyword: String,
    pub original_variants: Vec<String>,
    pub total_mentions: u64,
    pub daily_mentions: u64,
    pub sources: Vec<String>,
    pub unique_source_count: usize,
    pub avg_reliability: f64,
    pub score: f64,
    pub growth_rate: f64,
    pub peak_mentions: u64,
    pub days_without_growth: u32,
    pub first_seen: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub status: String,
}

impl From<&TrackedTrend> for TrendItem {
    fn from(trend: &TrackedTrend) -> Self {
        Self {
            canonical_keyword: trend.canonical_keyword.clone(),
            original_variants: trend.original_variants.iter().cloned().collect(),
            total_mentions: trend.total_mentions,
            daily_mentions: trend.daily_mentions,
            sources: trend.sources.iter().cloned().collect(),
            unique_source_count: trend.unique_source_count(),
            avg_reliability: trend.avg_reliability,
            score: trend.score,
            growth_rate: trend.growth_rate,
            peak_mentions: trend.peak_mentions,
            days_without_growth: trend.days_without_growth,
            first_seen: trend.first_seen,
            last_update: trend.last_update,
            status: trend.status.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TrendsQuery {
    pub include_archived: Option<bool>,
}

pub(super) async fn list_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<Vec<TrendItem>>>, ApiError> {
    let trends = trendwatch_db::list_trends(&state.pool, query.include_archived.unwrap_or(false))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = trends.iter().map(TrendItem::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_trend(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(keyword): Path<String>,
) -> Result<Json<ApiResponse<TrendItem>>, ApiError> {
    // Any variant spelling resolves to its canonical trend.
    let canonical = normalize_keyword(&keyword);
    let trend = trendwatch_db::get_trend_by_keyword(&state.pool, &canonical)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: TrendItem::from(&trend),
        meta: ResponseMeta::new(req_id.0),
    }))
}
