//! Delta-sync status reconciliation.
//!
//! A client reports the last time it synced. The reconciler compares that
//! checkpoint against the active profile, the notification schedule and the
//! aggregate's own mutation stamp, and describes what changed. Independently it
//! looks at the user's most recent health reports; a run of critical reports
//! yields an advisory "resync profile" recovery action the client may act on.

use chrono::{DateTime, Utc};
use shared::{
    ChangeDescriptor, ChangeKind, HealthStatus, RecoveryAction, RecoveryActionKind, SyncEntity,
    SyncStatusRequest, SyncStatusResponse,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SyncStatusConfig;
use crate::domain::commands::sync::SyncStatusQuery;
use crate::domain::errors::DomainError;
use crate::domain::models::UserAggregate;
use crate::mappers::ScheduleMapper;
use crate::storage::AggregateStorage;

/// Failure pattern found in the newest health reports
#[derive(Debug, Clone, PartialEq)]
pub struct FailurePattern {
    pub critical: usize,
    pub inspected: usize,
}

impl FailurePattern {
    pub fn describe(&self) -> String {
        if self.critical == self.inspected {
            format!("last {} sync health reports were all critical", self.inspected)
        } else {
            format!(
                "{} of the last {} sync health reports were critical",
                self.critical, self.inspected
            )
        }
    }
}

/// Look for a majority of critical reports among the newest `recovery_window` entries.
pub fn detect_failure_pattern(aggregate: &UserAggregate, config: &SyncStatusConfig) -> Option<FailurePattern> {
    let recent: Vec<_> = aggregate.recent_sync_health(config.recovery_window).collect();
    if recent.is_empty() || recent.len() < config.recovery_min_entries {
        return None;
    }
    let critical = recent
        .iter()
        .filter(|entry| entry.status == HealthStatus::Critical)
        .count();
    if critical * 2 > recent.len() {
        Some(FailurePattern {
            critical,
            inspected: recent.len(),
        })
    } else {
        None
    }
}

/// Service answering "does this client need to sync, and with what?"
#[derive(Clone)]
pub struct SyncStatusService {
    storage: Arc<dyn AggregateStorage>,
    config: SyncStatusConfig,
}

impl SyncStatusService {
    pub fn new(storage: Arc<dyn AggregateStorage>, config: SyncStatusConfig) -> Self {
        Self { storage, config }
    }

    pub async fn get_sync_status(
        &self,
        user_id: &str,
        request: SyncStatusRequest,
    ) -> Result<SyncStatusResponse, DomainError> {
        let query = SyncStatusQuery::try_from(request)?;
        info!(user_id, device_id = %query.device_id, last_sync_time = ?query.last_sync_time, "Checking sync status");

        let now = Utc::now();
        let aggregate = self.storage.load_aggregate(user_id).await?.map(|stored| stored.aggregate);

        let Some(aggregate) = aggregate else {
            let (needs_sync, reason) = match query.last_sync_time {
                None => (true, "initial sync required"),
                Some(_) => (false, "no server-side changes"),
            };
            return Ok(SyncStatusResponse {
                needs_sync,
                reason: reason.to_string(),
                profile_changes: Vec::new(),
                schedule_update: None,
                recovery_actions: Vec::new(),
                server_time: now,
            });
        };

        let mut response = match query.last_sync_time {
            None => self.initial_sync(&aggregate, now),
            Some(checkpoint) => self.delta_since(&aggregate, checkpoint, now),
        };
        response.recovery_actions = self.recovery_actions(&aggregate, user_id);

        info!(
            user_id,
            device_id = %query.device_id,
            needs_sync = response.needs_sync,
            changes = response.profile_changes.len(),
            recovery_actions = response.recovery_actions.len(),
            "Sync status computed"
        );
        Ok(response)
    }

    /// A client without a checkpoint gets the whole current state
    fn initial_sync(&self, aggregate: &UserAggregate, now: DateTime<Utc>) -> SyncStatusResponse {
        let mut profile_changes = Vec::new();
        if let Some(profile) = aggregate.active_profile() {
            profile_changes.push(ChangeDescriptor {
                entity: SyncEntity::Profile,
                entity_id: Some(profile.profile_id.clone()),
                change: ChangeKind::Updated,
                changed_at: profile.updated_at,
            });
        }
        if let Some(schedule) = &aggregate.fcm_schedule {
            profile_changes.push(ChangeDescriptor {
                entity: SyncEntity::Schedule,
                entity_id: Some(schedule.active_profile_id.clone()),
                change: ChangeKind::Updated,
                changed_at: schedule.updated_at,
            });
        }

        SyncStatusResponse {
            needs_sync: true,
            reason: "initial sync required".to_string(),
            profile_changes,
            schedule_update: aggregate.fcm_schedule.as_ref().map(ScheduleMapper::to_dto),
            recovery_actions: Vec::new(),
            server_time: now,
        }
    }

    fn delta_since(
        &self,
        aggregate: &UserAggregate,
        checkpoint: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> SyncStatusResponse {
        let mut profile_changes = Vec::new();
        let mut reasons = Vec::new();
        let mut schedule_update = None;

        if let Some(profile) = aggregate.active_profile().filter(|p| p.updated_at > checkpoint) {
            profile_changes.push(ChangeDescriptor {
                entity: SyncEntity::Profile,
                entity_id: Some(profile.profile_id.clone()),
                change: ChangeKind::Updated,
                changed_at: profile.updated_at,
            });
            reasons.push("active profile updated");
        }

        match &aggregate.fcm_schedule {
            Some(schedule) if schedule.updated_at > checkpoint => {
                profile_changes.push(ChangeDescriptor {
                    entity: SyncEntity::Schedule,
                    entity_id: Some(schedule.active_profile_id.clone()),
                    change: ChangeKind::Updated,
                    changed_at: schedule.updated_at,
                });
                schedule_update = Some(ScheduleMapper::to_dto(schedule));
                reasons.push("notification schedule updated");
            }
            Some(_) => {}
            None => {
                if let Some(changed_at) = aggregate.schedule_removed_at.filter(|at| *at > checkpoint) {
                    profile_changes.push(ChangeDescriptor {
                        entity: SyncEntity::Schedule,
                        entity_id: None,
                        change: ChangeKind::Removed,
                        changed_at,
                    });
                    reasons.push("notification schedule removed");
                }
            }
        }

        let needs_sync = !profile_changes.is_empty();
        let reason = if needs_sync {
            format!("{} since last sync", reasons.join(" and "))
        } else {
            "client is up to date".to_string()
        };

        SyncStatusResponse {
            needs_sync,
            reason,
            profile_changes,
            schedule_update,
            recovery_actions: Vec::new(),
            server_time: now,
        }
    }

    fn recovery_actions(&self, aggregate: &UserAggregate, user_id: &str) -> Vec<RecoveryAction> {
        let Some(pattern) = detect_failure_pattern(aggregate, &self.config) else {
            return Vec::new();
        };
        let Some(profile) = aggregate.active_profile() else {
            info!(user_id, "Failure pattern detected but no active profile to resync");
            return Vec::new();
        };

        warn!(user_id, profile_id = %profile.profile_id, critical = pattern.critical, inspected = pattern.inspected, "Persistent sync failures, suggesting profile resync");
        vec![RecoveryAction {
            action: RecoveryActionKind::ResyncProfile,
            profile_id: profile.profile_id.clone(),
            reason: pattern.describe(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HealthScoringConfig;
    use crate::domain::profile_service::ProfileService;
    use crate::domain::sync_health_service::SyncHealthService;
    use crate::storage::{AggregateRepository, DbConnection};
    use chrono::Duration;
    use shared::{CreateOrUpdateProfileRequest, RecordSyncHealthRequest, SyncMetrics, TimeOfDay};

    struct Harness {
        profiles: ProfileService,
        health: SyncHealthService,
        status: SyncStatusService,
    }

    async fn create_harness() -> Harness {
        let db = DbConnection::in_memory().await.expect("Failed to init test DB");
        let storage: Arc<dyn AggregateStorage> = Arc::new(AggregateRepository::new(db));
        Harness {
            profiles: ProfileService::new(storage.clone()),
            health: SyncHealthService::new(storage.clone(), HealthScoringConfig::default()),
            status: SyncStatusService::new(storage, SyncStatusConfig::default()),
        }
    }

    fn active_request(profile_id: &str) -> CreateOrUpdateProfileRequest {
        CreateOrUpdateProfileRequest {
            profile_id: Some(profile_id.to_string()),
            title: Some("Hydrate".to_string()),
            media_reference: Some("https://media.example/water.mp4".to_string()),
            cadence_per_day: Some(4),
            active_weekdays: Some(vec![1, 2, 3, 4, 5, 6, 7]),
            window_start: Some(TimeOfDay::new(9, 0).unwrap()),
            window_end: Some(TimeOfDay::new(18, 0).unwrap()),
            is_active: Some(true),
            morning_time: Some(TimeOfDay::new(9, 0).unwrap()),
            evening_time: Some(TimeOfDay::new(18, 0).unwrap()),
            ..Default::default()
        }
    }

    fn status_request(last_sync_time: Option<DateTime<Utc>>) -> SyncStatusRequest {
        SyncStatusRequest {
            device_id: Some("phone".to_string()),
            last_sync_time,
        }
    }

    async fn report(harness: &Harness, success: u32, failure: u32) {
        harness
            .health
            .record_sync_health(
                "u1",
                RecordSyncHealthRequest {
                    device_id: Some("phone".to_string()),
                    device_state: None,
                    sync_metrics: Some(SyncMetrics {
                        success_count: Some(success),
                        failure_count: Some(failure),
                        ..Default::default()
                    }),
                },
            )
            .await
            .expect("Failed to record health");
    }

    #[tokio::test]
    async fn test_no_checkpoint_always_needs_sync() {
        let harness = create_harness().await;

        let unknown = harness.status.get_sync_status("ghost", status_request(None)).await.unwrap();
        assert!(unknown.needs_sync);
        assert!(unknown.reason.contains("initial"));

        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();
        let known = harness.status.get_sync_status("u1", status_request(None)).await.unwrap();
        assert!(known.needs_sync);
        assert!(known.reason.contains("initial"));
        assert_eq!(known.profile_changes.len(), 2);
        assert_eq!(known.schedule_update.unwrap().active_profile_id, "a");
    }

    #[tokio::test]
    async fn test_unknown_user_with_checkpoint_needs_nothing() {
        let harness = create_harness().await;
        let response = harness
            .status
            .get_sync_status("ghost", status_request(Some(Utc::now())))
            .await
            .unwrap();
        assert!(!response.needs_sync);
        assert!(response.profile_changes.is_empty());
        assert!(response.recovery_actions.is_empty());
    }

    #[tokio::test]
    async fn test_changes_after_checkpoint_are_reported() {
        let harness = create_harness().await;
        let checkpoint = Utc::now() - Duration::seconds(5);
        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();

        let response = harness
            .status
            .get_sync_status("u1", status_request(Some(checkpoint)))
            .await
            .unwrap();

        assert!(response.needs_sync);
        let entities: Vec<SyncEntity> = response.profile_changes.iter().map(|c| c.entity).collect();
        assert_eq!(entities, vec![SyncEntity::Profile, SyncEntity::Schedule]);
        assert!(response.schedule_update.is_some());
        assert!(response.reason.contains("since last sync"));
    }

    #[tokio::test]
    async fn test_up_to_date_client() {
        let harness = create_harness().await;
        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();

        let response = harness
            .status
            .get_sync_status("u1", status_request(Some(Utc::now() + Duration::seconds(1))))
            .await
            .unwrap();

        assert!(!response.needs_sync);
        assert!(response.profile_changes.is_empty());
        assert!(response.schedule_update.is_none());
    }

    #[tokio::test]
    async fn test_removed_schedule_is_reported() {
        let harness = create_harness().await;
        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();
        let checkpoint = Utc::now();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        harness.profiles.delete_profile("u1", "a").await.unwrap();

        let response = harness
            .status
            .get_sync_status("u1", status_request(Some(checkpoint)))
            .await
            .unwrap();

        assert!(response.needs_sync);
        assert_eq!(response.profile_changes.len(), 1);
        assert_eq!(response.profile_changes[0].change, ChangeKind::Removed);
        assert!(response.schedule_update.is_none());
    }

    #[tokio::test]
    async fn test_inactive_profile_edit_without_schedule_needs_no_sync() {
        let harness = create_harness().await;
        let inactive = |profile_id: &str| CreateOrUpdateProfileRequest {
            is_active: None,
            morning_time: None,
            evening_time: None,
            ..active_request(profile_id)
        };
        harness.profiles.create_or_update_profile("u1", inactive("a")).await.unwrap();
        let checkpoint = Utc::now();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        harness.profiles.create_or_update_profile("u1", inactive("b")).await.unwrap();

        let response = harness
            .status
            .get_sync_status("u1", status_request(Some(checkpoint)))
            .await
            .unwrap();

        assert!(!response.needs_sync);
        assert!(response.profile_changes.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_removed_before_checkpoint_is_not_reported_again() {
        let harness = create_harness().await;
        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();
        let mut deactivate = active_request("a");
        deactivate.is_active = Some(false);
        deactivate.morning_time = None;
        deactivate.evening_time = None;
        harness.profiles.create_or_update_profile("u1", deactivate.clone()).await.unwrap();

        let checkpoint = Utc::now();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        deactivate.title = Some("Renamed".to_string());
        harness.profiles.create_or_update_profile("u1", deactivate).await.unwrap();

        let response = harness
            .status
            .get_sync_status("u1", status_request(Some(checkpoint)))
            .await
            .unwrap();

        assert!(!response.needs_sync);
    }

    #[tokio::test]
    async fn test_deactivation_after_checkpoint_reports_removal() {
        let harness = create_harness().await;
        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();
        let checkpoint = Utc::now();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let mut deactivate = active_request("a");
        deactivate.is_active = Some(false);
        deactivate.morning_time = None;
        deactivate.evening_time = None;
        harness.profiles.create_or_update_profile("u1", deactivate).await.unwrap();

        let response = harness
            .status
            .get_sync_status("u1", status_request(Some(checkpoint)))
            .await
            .unwrap();

        assert!(response.needs_sync);
        assert!(response
            .profile_changes
            .iter()
            .any(|c| c.entity == SyncEntity::Schedule && c.change == ChangeKind::Removed));
    }

    #[tokio::test]
    async fn test_five_critical_reports_suggest_resync() {
        let harness = create_harness().await;
        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();
        for _ in 0..5 {
            report(&harness, 1, 9).await;
        }

        let response = harness
            .status
            .get_sync_status("u1", status_request(Some(Utc::now())))
            .await
            .unwrap();

        assert_eq!(response.recovery_actions.len(), 1);
        let action = &response.recovery_actions[0];
        assert_eq!(action.action, RecoveryActionKind::ResyncProfile);
        assert_eq!(action.profile_id, "a");
        assert!(action.reason.contains("critical"));
    }

    #[tokio::test]
    async fn test_recovered_device_gets_no_recovery_action() {
        let harness = create_harness().await;
        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();
        for _ in 0..4 {
            report(&harness, 1, 9).await;
        }
        for _ in 0..3 {
            report(&harness, 10, 0).await;
        }

        let response = harness.status.get_sync_status("u1", status_request(None)).await.unwrap();
        assert!(response.recovery_actions.is_empty());
    }

    #[tokio::test]
    async fn test_too_few_reports_are_not_a_pattern() {
        let harness = create_harness().await;
        harness.profiles.create_or_update_profile("u1", active_request("a")).await.unwrap();
        report(&harness, 0, 10).await;
        report(&harness, 0, 10).await;

        let response = harness.status.get_sync_status("u1", status_request(None)).await.unwrap();
        assert!(response.recovery_actions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_device_id_rejected() {
        let harness = create_harness().await;
        let result = harness
            .status
            .get_sync_status(
                "u1",
                SyncStatusRequest {
                    device_id: None,
                    last_sync_time: None,
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation { ref field, .. }) if field == "device_id"));
    }
}
