use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::domain::models::UserAggregate;
use crate::storage::connection::DbConnection;
use crate::storage::traits::{AggregateStorage, StorageError, VersionedAggregate};

/// SQLite-backed aggregate store with optimistic concurrency
#[derive(Clone)]
pub struct AggregateRepository {
    db: DbConnection,
}

impl AggregateRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AggregateStorage for AggregateRepository {
    async fn load_aggregate(&self, user_id: &str) -> Result<Option<VersionedAggregate>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT version, document
            FROM user_aggregates
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => {
                let version: i64 = r.get("version");
                let document: String = r.get("document");
                let aggregate: UserAggregate = serde_json::from_str(&document)?;
                Ok(Some(VersionedAggregate {
                    aggregate,
                    version: version as u64,
                }))
            }
            None => Ok(None),
        }
    }

    async fn save_aggregate(
        &self,
        aggregate: &UserAggregate,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError> {
        let document = serde_json::to_string(aggregate)?;
        let now = Utc::now().to_rfc3339();

        let (result, new_version) = match expected_version {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO user_aggregates (user_id, version, document, updated_at)
                    VALUES (?, 1, ?, ?)
                    ON CONFLICT(user_id) DO NOTHING
                    "#,
                )
                .bind(&aggregate.user_id)
                .bind(&document)
                .bind(&now)
                .execute(self.db.pool())
                .await?;
                (result, 1)
            }
            Some(version) => {
                let result = sqlx::query(
                    r#"
                    UPDATE user_aggregates
                    SET version = version + 1, document = ?, updated_at = ?
                    WHERE user_id = ? AND version = ?
                    "#,
                )
                .bind(&document)
                .bind(&now)
                .bind(&aggregate.user_id)
                .bind(version as i64)
                .execute(self.db.pool())
                .await?;
                (result, version + 1)
            }
        };

        if result.rows_affected() == 0 {
            return Err(StorageError::VersionConflict {
                user_id: aggregate.user_id.clone(),
                expected: expected_version,
            });
        }

        debug!(user_id = %aggregate.user_id, version = new_version, "Stored user aggregate");
        Ok(new_version)
    }
}
