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
pub(super) struct VipObservationItem {
    pub id: i64,
    pub entity_id: String,
    pub name: String,
    pub tier: i16,
    pub total_mentions: i64,
    pub sources: Value,
    pub sample_content: Value,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VipObservationsQuery {
    pub entity_id: Option<String>,
    pub limit: Option<i64>,
}

pub(super) async fn list_vip_observations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<VipObservationsQuery>,
) -> Result<Json<ApiResponse<Vec<VipObservationItem>>>, ApiError> {
    let rows = trendwatch_db::list_vip_observations(
        &state.pool,
        query.entity_id.as_deref(),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| VipObservationItem {
            id: row.id,
            entity_id: row.entity_id,
            name: row.name,
            tier: row.tier,
            total_mentions: row.total_mentions,
            sources: row.sources,
            sample_content: row.sample_content,
            observed_at: row.observed_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
