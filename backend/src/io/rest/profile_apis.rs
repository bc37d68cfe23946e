//! # REST API for Alarm Profiles
//!
//! Endpoints for listing, upserting, activating and deleting profiles.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use shared::{
    ActivateProfileResponse, CreateOrUpdateProfileRequest, CreateOrUpdateProfileResponse,
    DeleteProfileResponse, GetProfilesResponse,
};
use tracing::info;

use super::{ApiError, CallerIdentity};
use crate::AppState;

/// List the caller's profiles
pub async fn get_profiles(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
) -> Result<Json<GetProfilesResponse>, ApiError> {
    info!(user_id = %user_id, "GET /api/profiles");

    let response = state.profile_service.get_profiles(&user_id).await?;
    Ok(Json(response))
}

/// Create or update a profile; 201 when a new profile was created
pub async fn create_or_update_profile(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Json(request): Json<CreateOrUpdateProfileRequest>,
) -> Result<(StatusCode, Json<CreateOrUpdateProfileResponse>), ApiError> {
    info!(user_id = %user_id, "PUT /api/profiles - request: {:?}", request);

    let response = state
        .profile_service
        .create_or_update_profile(&user_id, request)
        .await?;
    let status = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

pub async fn activate_profile(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Path(profile_id): Path<String>,
) -> Result<Json<ActivateProfileResponse>, ApiError> {
    info!(user_id = %user_id, "POST /api/profiles/{}/activate", profile_id);

    let response = state.profile_service.activate_profile(&user_id, &profile_id).await?;
    Ok(Json(response))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Path(profile_id): Path<String>,
) -> Result<Json<DeleteProfileResponse>, ApiError> {
    info!(user_id = %user_id, "DELETE /api/profiles/{}", profile_id);

    let response = state.profile_service.delete_profile(&user_id, &profile_id).await?;
    Ok(Json(response))
}
