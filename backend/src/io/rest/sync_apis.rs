//! # REST API for Device Sync

use axum::{
    extract::{Query, State},
    response::Json,
};
use shared::{RecordSyncHealthRequest, RecordSyncHealthResponse, SyncStatusRequest, SyncStatusResponse};
use tracing::info;

use super::{ApiError, CallerIdentity};
use crate::AppState;

/// Record one sync health report from a device
pub async fn record_sync_health(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Json(request): Json<RecordSyncHealthRequest>,
) -> Result<Json<RecordSyncHealthResponse>, ApiError> {
    info!(user_id = %user_id, "POST /api/sync/health - device: {:?}", request.device_id);

    let response = state.sync_health_service.record_sync_health(&user_id, request).await?;
    Ok(Json(response))
}

/// `GET /api/sync/status?device_id=..&last_sync_time=..`
pub async fn get_sync_status(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Query(request): Query<SyncStatusRequest>,
) -> Result<Json<SyncStatusResponse>, ApiError> {
    info!(user_id = %user_id, "GET /api/sync/status - request: {:?}", request);

    let response = state.sync_status_service.get_sync_status(&user_id, request).await?;
    Ok(Json(response))
}
