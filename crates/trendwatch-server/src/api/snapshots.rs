use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SnapshotItem {
    pub id: i64,
    pub captured_at: DateTime<Utc>,
    pub entry_count: i32,
}

#[derive(Debug, Serialize)]
pub(super) struct SnapshotEntryItem {
    pub rank: i32,
    pub canonical_keyword: String,
    pub score: f64,
    pub total_mentions: i64,
    pub daily_mentions: i64,
    pub unique_source_count: i32,
    pub growth_rate: f64,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SnapshotDetail {
    pub id: i64,
    pub captured_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntryItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SnapshotsQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_snapshots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SnapshotsQuery>,
) -> Result<Json<ApiResponse<Vec<SnapshotItem>>>, ApiError> {
    let rows = trendwatch_db::list_snapshots(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| SnapshotItem {
            id: row.id,
            captured_at: row.captured_at,
            entry_count: row.entry_count,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn latest_snapshot(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SnapshotDetail>>, ApiError> {
    let header = trendwatch_db::get_latest_snapshot(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no snapshot recorded yet"))?;

    let entries = trendwatch_db::list_snapshot_entries(&state.pool, header.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = SnapshotDetail {
        id: header.id,
        captured_at: header.captured_at,
        entries: entries
            .into_iter()
            .map(|row| SnapshotEntryItem {
                rank: row.rank,
                canonical_keyword: row.canonical_keyword,
                score: row.score,
                total_mentions: row.total_mentions,
                daily_mentions: row.daily_mentions,
                unique_source_count: row.unique_source_count,
                growth_rate: row.growth_rate,
                status: row.status,
            })
            .collect(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
