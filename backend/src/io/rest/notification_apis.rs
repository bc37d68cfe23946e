//! # REST API for Notification Delivery Logs

use axum::{extract::State, response::Json};
use shared::{RecordNotificationRequest, RecordNotificationResponse};
use tracing::info;

use super::{ApiError, CallerIdentity};
use crate::AppState;

pub async fn record_notification(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Json(request): Json<RecordNotificationRequest>,
) -> Result<Json<RecordNotificationResponse>, ApiError> {
    info!(user_id = %user_id, "POST /api/notifications/logs - request: {:?}", request);

    let response = state
        .notification_log_service
        .record_notification(&user_id, request)
        .await?;
    Ok(Json(response))
}
