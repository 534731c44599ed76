use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct HotIssueItem {
    pub id: i64,
    pub keyword: String,
    pub mentions: i64,
    pub sentiment_breakdown: Value,
    pub sample_content: Value,
    pub priority: i32,
    pub should_auto_generate: bool,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HotIssuesQuery {
    pub keyword: Option<String>,
    pub limit: Option<i64>,
}

pub(super) async fn list_hot_issues(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<HotIssuesQuery>,
) -> Result<Json<ApiResponse<Vec<HotIssueItem>>>, ApiError> {
    let rows = trendwatch_db::list_hot_issues(
        &state.pool,
        query.keyword.as_deref(),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| HotIssueItem {
            id: row.id,
            keyword: row.keyword,
            mentions: row.mentions,
            sentiment_breakdown: row.sentiment_breakdown,
            sample_content: row.sample_content,
            priority: row.priority,
            should_auto_generate: row.should_auto_generate,
            detected_at: row.detected_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
