//! # Storage Traits
//!
//! The domain layer only needs one thing from persistence: read a user's
//! aggregate together with its version, and write it back only if nobody else
//! wrote in between. Any backend that can offer that per-user compare-and-swap
//! can implement [`AggregateStorage`].

use async_trait::async_trait;

use crate::domain::models::UserAggregate;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("aggregate for user {user_id} changed since version {expected:?} was read")]
    VersionConflict {
        user_id: String,
        expected: Option<u64>,
    },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("aggregate document could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An aggregate together with the version it was read at
#[derive(Debug, Clone)]
pub struct VersionedAggregate {
    pub aggregate: UserAggregate,
    pub version: u64,
}

#[async_trait]
pub trait AggregateStorage: Send + Sync {
    /// Load a user's aggregate, or `None` if the user never wrote anything
    async fn load_aggregate(&self, user_id: &str) -> Result<Option<VersionedAggregate>, StorageError>;

    /// Persist `aggregate` if the stored version still equals `expected_version`.
    ///
    /// `None` means "the aggregate must not exist yet". Returns the new version,
    /// or [`StorageError::VersionConflict`] when another writer got there first.
    async fn save_aggregate(
        &self,
        aggregate: &UserAggregate,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError>;

    /// Load for a read-modify-write, creating an empty aggregate on first contact
    async fn load_or_new(&self, user_id: &str) -> Result<(UserAggregate, Option<u64>), StorageError> {
        Ok(match self.load_aggregate(user_id).await? {
            Some(stored) => (stored.aggregate, Some(stored.version)),
            None => (UserAggregate::new(user_id), None),
        })
    }
}
