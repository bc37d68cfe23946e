//! Records delivery reports from the push transport into the user's rotating
//! notification log, dropping retries the dedup cache has already seen.

use chrono::Utc;
use shared::{RecordNotificationRequest, RecordNotificationResponse};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::notifications::RecordNotificationCommand;
use crate::domain::delivery_dedup::{DeliveryDedupCache, DeliveryKey};
use crate::domain::errors::DomainError;
use crate::domain::models::NotificationLogEntry;
use crate::storage::AggregateStorage;

#[derive(Clone)]
pub struct NotificationLogService {
    storage: Arc<dyn AggregateStorage>,
    dedup: Arc<DeliveryDedupCache>,
}

impl NotificationLogService {
    pub fn new(storage: Arc<dyn AggregateStorage>, dedup: Arc<DeliveryDedupCache>) -> Self {
        Self { storage, dedup }
    }

    pub async fn record_notification(
        &self,
        user_id: &str,
        request: RecordNotificationRequest,
    ) -> Result<RecordNotificationResponse, DomainError> {
        let command = RecordNotificationCommand::try_from(request)?;
        info!(user_id, profile_id = %command.profile_id, slot = ?command.slot, "Recording notification delivery");

        let stored = self
            .storage
            .load_aggregate(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;
        let mut aggregate = stored.aggregate;

        if aggregate.find_profile(&command.profile_id).is_none() {
            return Err(DomainError::ProfileNotFound {
                user_id: user_id.to_string(),
                profile_id: command.profile_id,
            });
        }

        let key = DeliveryKey::new(user_id, &command.profile_id, command.slot);
        if self.dedup.is_recent(&key).await {
            warn!(user_id, profile_id = %command.profile_id, "Duplicate delivery report dropped");
            return Ok(RecordNotificationResponse {
                log_id: None,
                deduplicated: true,
                retained_entries: aggregate.notification_logs.len(),
            });
        }

        let now = Utc::now();
        let log_id = uuid::Uuid::new_v4().to_string();
        aggregate.push_notification_log(NotificationLogEntry {
            log_id: log_id.clone(),
            profile_id: command.profile_id.clone(),
            slot: command.slot,
            status: command.status,
            delivered_at: command.delivered_at.unwrap_or(now),
            recorded_at: now,
        });

        self.storage
            .save_aggregate(&aggregate, Some(stored.version))
            .await
            .map_err(DomainError::from)?;
        // Only remember deliveries that were actually persisted, so a failed write can be retried
        self.dedup.remember(key).await;

        Ok(RecordNotificationResponse {
            log_id: Some(log_id),
            deduplicated: false,
            retained_entries: aggregate.notification_logs.len(),
        })
    }
}
