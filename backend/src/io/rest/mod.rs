//! # REST API Interface Layer
//!
//! HTTP endpoints over the domain services.
//!
//! - **Caller identity**: the `x-user-id` header, set by an upstream gateway
//!   that has already verified the caller. A request without it is rejected
//!   with 401 before any service runs.
//! - **Error translation**: [`DomainError`] kinds map onto status codes and a
//!   JSON [`ErrorResponse`] body that names the offending field for
//!   validation failures.

pub mod notification_apis;
pub mod profile_apis;
pub mod sync_apis;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::{error, warn};

use crate::domain::DomainError;

pub use notification_apis::*;
pub use profile_apis::*;
pub use sync_apis::*;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Errors a handler can return
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing or empty x-user-id header")]
    Unauthenticated,
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Domain(err) => match err {
                DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
                DomainError::UserNotFound(_) | DomainError::ProfileNotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::Conflict { .. } => StatusCode::CONFLICT,
                DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Unauthenticated => ErrorResponse {
                kind: "unauthenticated".to_string(),
                message: self.to_string(),
                field: None,
            },
            ApiError::Domain(err) => ErrorResponse {
                kind: err.kind().to_string(),
                message: err.to_string(),
                field: match err {
                    DomainError::Validation { field, .. } => Some(field.clone()),
                    _ => None,
                },
            },
        };

        if status.is_server_error() {
            error!(status = %status, "Request failed: {}", body.message);
        } else {
            warn!(status = %status, kind = %body.kind, "Request rejected: {}", body.message);
        }

        (status, Json(body)).into_response()
    }
}

/// Authenticated caller, taken from the `x-user-id` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CallerIdentity(value.to_string()))
            .ok_or(ApiError::Unauthenticated)
    }
}
