//! Manual poll triggers for external schedulers.
//!
//! Gated by the `x-cron-secret` header compared in constant time against
//! `TRENDWATCH_CRON_SECRET`. The poll runs inline and the response carries
//! the run summary, so a caller can tell a quiet cycle from a broken one.

use axum::{
    extract::State,
    http::HeaderMap,
    Extension, Json,
};

use crate::jobs::{self, TrendPollSummary, VipPollSummary};
use crate::middleware::{cron_secret_matches, RequestId};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

fn check_secret(state: &AppState, headers: &HeaderMap, req_id: &str) -> Result<(), ApiError> {
    let provided = headers.get("x-cron-secret").and_then(|v| v.to_str().ok());
    if cron_secret_matches(state.config.cron_secret.as_deref(), provided) {
        Ok(())
    } else {
        Err(ApiError::new(
            req_id.to_string(),
            "unauthorized",
            "missing or invalid cron secret",
        ))
    }
}

pub(super) async fn trigger_trend_poll(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<TrendPollSummary>>, ApiError> {
    check_secret(&state, &headers, &req_id.0)?;

    let summary = jobs::run_trend_poll(&state.pool, &state.config, &state.roster, "api")
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "triggered trend poll failed");
            ApiError::new(req_id.0.clone(), "internal_error", "trend poll failed")
        })?;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn trigger_vip_poll(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<VipPollSummary>>, ApiError> {
    check_secret(&state, &headers, &req_id.0)?;

    let summary = jobs::run_vip_poll(&state.pool, &state.config, &state.roster, "api")
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "triggered VIP poll failed");
            ApiError::new(req_id.0.clone(), "internal_error", "VIP poll failed")
        })?;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}
