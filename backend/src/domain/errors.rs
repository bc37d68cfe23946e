use crate::storage::StorageError;

/// Failure kinds surfaced by every domain operation.
///
/// Any error aborts the operation before its write, so no partial state is
/// ever persisted.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },
    #[error("no alarm data exists for user {0}")]
    UserNotFound(String),
    #[error("profile {profile_id} not found for user {user_id}")]
    ProfileNotFound { user_id: String, profile_id: String },
    #[error("concurrent modification of user {user_id}; retry the operation")]
    Conflict { user_id: String },
    #[error("storage failure: {0}")]
    Store(String),
}

impl DomainError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::validation(field, "is required")
    }

    /// Conflicts are safe to retry as a whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }

    /// Stable machine-readable kind, used in error responses
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "validation",
            DomainError::UserNotFound(_) => "user_not_found",
            DomainError::ProfileNotFound { .. } => "profile_not_found",
            DomainError::Conflict { .. } => "conflict",
            DomainError::Store(_) => "store",
        }
    }
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::VersionConflict { user_id, .. } => DomainError::Conflict { user_id },
            other => DomainError::Store(other.to_string()),
        }
    }
}
