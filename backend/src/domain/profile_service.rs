//! Profile lifecycle domain logic.
//!
//! Owns creation, update, activation and deletion of alarm profiles, and the
//! two rules that tie profiles to the notification schedule:
//!
//! - At most one profile per user is active.
//! - A schedule exists exactly when some profile is active, and it points at
//!   that profile.
//!
//! Every operation loads the user's aggregate once, applies the whole change to
//! that copy (pivot, schedule rewrite, cascade) and saves it with a version
//! check. A concurrent writer makes the save fail with a conflict instead of
//! interleaving, so readers never see two active profiles or a dangling schedule.

use chrono::Utc;
use shared::{
    ActivateProfileResponse, CreateOrUpdateProfileRequest, CreateOrUpdateProfileResponse,
    DeleteProfileResponse, GetProfilesResponse,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::profiles::UpsertProfileCommand;
use crate::domain::errors::DomainError;
use crate::domain::models::{AlarmProfile, NotificationSchedule, UserAggregate};
use crate::mappers::{ProfileMapper, ScheduleMapper};
use crate::storage::AggregateStorage;

/// Service for managing alarm profiles and the schedule that follows them
fn schedule_needs_active_profile() -> DomainError {
    DomainError::validation("is_active", "schedule times require an active profile")
}

#[derive(Clone)]
pub struct ProfileService {
    storage: Arc<dyn AggregateStorage>,
}

impl ProfileService {
    pub fn new(storage: Arc<dyn AggregateStorage>) -> Self {
        Self { storage }
    }

    /// List a user's profiles split into active and inactive.
    ///
    /// A user with no stored data gets empty lists.
    pub async fn get_profiles(&self, user_id: &str) -> Result<GetProfilesResponse, DomainError> {
        info!(user_id, "Getting profiles");

        let aggregate = match self.storage.load_aggregate(user_id).await? {
            Some(stored) => stored.aggregate,
            None => UserAggregate::new(user_id),
        };

        let (active, inactive): (Vec<&AlarmProfile>, Vec<&AlarmProfile>) =
            aggregate.alarm_profiles.iter().partition(|p| p.is_active);

        Ok(GetProfilesResponse {
            active_count: active.len(),
            inactive_count: inactive.len(),
            total_count: aggregate.alarm_profiles.len(),
            active_profiles: ProfileMapper::to_legacy_list(active, user_id),
            inactive_profiles: ProfileMapper::to_legacy_list(inactive, user_id),
        })
    }

    /// Create a profile, or update it in place if the id already exists.
    ///
    /// With `is_active = Some(true)` every other profile is switched off and the
    /// schedule is rewritten to point here, all in the same write.
    pub async fn create_or_update_profile(
        &self,
        user_id: &str,
        request: CreateOrUpdateProfileRequest,
    ) -> Result<CreateOrUpdateProfileResponse, DomainError> {
        let command = UpsertProfileCommand::try_from(request)?;
        info!(user_id, profile_id = %command.profile_id, requested_active = ?command.requested_active, "Creating or updating profile");

        let (mut aggregate, version) = self.storage.load_or_new(user_id).await?;
        let now = Utc::now();

        let created = match aggregate.find_profile_mut(&command.profile_id) {
            Some(profile) => {
                profile.title = command.title.clone();
                profile.media_reference = command.media_reference.clone();
                profile.cadence = command.cadence.clone();
                profile.updated_at = now;
                false
            }
            None => {
                aggregate.alarm_profiles.push(AlarmProfile {
                    profile_id: command.profile_id.clone(),
                    title: command.title.clone(),
                    media_reference: command.media_reference.clone(),
                    cadence: command.cadence.clone(),
                    is_active: false,
                    created_at: now,
                    updated_at: now,
                });
                true
            }
        };

        let mut deactivated = Vec::new();
        match (command.requested_active, command.schedule) {
            (Some(true), Some(settings)) => {
                deactivated = aggregate.activate(&command.profile_id, now);
                aggregate.fcm_schedule = Some(NotificationSchedule::new(
                    &command.profile_id,
                    settings.morning_time,
                    settings.evening_time,
                    settings.timezone,
                    now,
                ));
                if !deactivated.is_empty() {
                    info!(
                        user_id,
                        profile_id = %command.profile_id,
                        deactivated = deactivated.len(),
                        "Switched active profile"
                    );
                }
            }
            (Some(false), Some(_)) => return Err(schedule_needs_active_profile()),
            (Some(false), None) => {
                if aggregate.deactivate(&command.profile_id, now) {
                    info!(user_id, profile_id = %command.profile_id, "Deactivated profile, notifications disabled");
                }
            }
            (_, Some(settings)) => {
                // Only the active profile owns the schedule
                let is_active = aggregate
                    .find_profile(&command.profile_id)
                    .map(|p| p.is_active)
                    .unwrap_or(false);
                if !is_active {
                    return Err(schedule_needs_active_profile());
                }
                aggregate.fcm_schedule = Some(NotificationSchedule::new(
                    &command.profile_id,
                    settings.morning_time,
                    settings.evening_time,
                    settings.timezone,
                    now,
                ));
            }
            (_, None) => {}
        }

        aggregate.updated_at = Some(now);
        debug_assert!(aggregate.check_invariants().is_ok());
        self.save(&aggregate, version).await?;

        let profile = aggregate
            .find_profile(&command.profile_id)
            .ok_or_else(|| DomainError::Store("profile vanished during upsert".to_string()))?;

        info!(user_id, profile_id = %profile.profile_id, created, "Profile stored");

        Ok(CreateOrUpdateProfileResponse {
            profile: ProfileMapper::to_legacy(profile, user_id),
            created,
            deactivated_profiles: ProfileMapper::to_legacy_list(&deactivated, user_id),
            schedule: aggregate.fcm_schedule.as_ref().map(ScheduleMapper::to_dto),
        })
    }

    /// Make an existing profile the active one without changing its fields.
    ///
    /// Activating the profile that is already active writes nothing.
    pub async fn activate_profile(
        &self,
        user_id: &str,
        profile_id: &str,
    ) -> Result<ActivateProfileResponse, DomainError> {
        info!(user_id, profile_id, "Activating profile");

        let stored = self
            .storage
            .load_aggregate(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;
        let mut aggregate = stored.aggregate;

        let profile = aggregate.find_profile(profile_id).ok_or_else(|| DomainError::ProfileNotFound {
            user_id: user_id.to_string(),
            profile_id: profile_id.to_string(),
        })?;

        if let (true, Some(schedule)) = (profile.is_active, &aggregate.fcm_schedule) {
            if schedule.active_profile_id == profile_id && aggregate.active_count() == 1 {
                info!(user_id, profile_id, "Profile already active");
                return Ok(ActivateProfileResponse {
                    profile: ProfileMapper::to_legacy(profile, user_id),
                    deactivated_profiles: Vec::new(),
                    schedule: ScheduleMapper::to_dto(schedule),
                    already_active: true,
                });
            }
        }

        let now = Utc::now();
        let deactivated = aggregate.activate(profile_id, now);
        let schedule = {
            let profile = aggregate.find_profile(profile_id).ok_or_else(|| DomainError::ProfileNotFound {
                user_id: user_id.to_string(),
                profile_id: profile_id.to_string(),
            })?;
            NotificationSchedule::for_profile(profile, aggregate.fcm_schedule.as_ref(), now)
        };
        aggregate.fcm_schedule = Some(schedule);
        aggregate.updated_at = Some(now);
        debug_assert!(aggregate.check_invariants().is_ok());

        self.save(&aggregate, Some(stored.version)).await?;

        info!(user_id, profile_id, deactivated = deactivated.len(), "Profile activated");

        let profile = aggregate
            .find_profile(profile_id)
            .ok_or_else(|| DomainError::Store("profile vanished during activation".to_string()))?;
        let schedule = aggregate
            .fcm_schedule
            .as_ref()
            .ok_or_else(|| DomainError::Store("schedule vanished during activation".to_string()))?;

        Ok(ActivateProfileResponse {
            profile: ProfileMapper::to_legacy(profile, user_id),
            deactivated_profiles: ProfileMapper::to_legacy_list(&deactivated, user_id),
            schedule: ScheduleMapper::to_dto(schedule),
            already_active: false,
        })
    }

    /// Delete a profile, cascading to the schedule and its delivery logs when it
    /// was the active one.
    ///
    /// If other profiles remain, the most recently created one takes over with a
    /// fresh schedule; otherwise notifications end up disabled.
    pub async fn delete_profile(
        &self,
        user_id: &str,
        profile_id: &str,
    ) -> Result<DeleteProfileResponse, DomainError> {
        info!(user_id, profile_id, "Deleting profile");

        let stored = self
            .storage
            .load_aggregate(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;
        let mut aggregate = stored.aggregate;

        let index = aggregate
            .alarm_profiles
            .iter()
            .position(|p| p.profile_id == profile_id)
            .ok_or_else(|| DomainError::ProfileNotFound {
                user_id: user_id.to_string(),
                profile_id: profile_id.to_string(),
            })?;

        let now = Utc::now();
        let removed = aggregate.alarm_profiles.remove(index);
        let was_active = removed.is_active;

        let mut schedule_deleted = false;
        let mut purged_log_count = 0;
        let mut activated_profile_id = None;

        if was_active {
            let previous_schedule = aggregate.clear_schedule(now);
            schedule_deleted = previous_schedule.is_some();
            purged_log_count = aggregate.purge_notification_logs(profile_id);
            info!(user_id, profile_id, purged_log_count, "Removed schedule and delivery logs of deleted active profile");

            if let Some(successor_id) = aggregate.successor_candidate().map(|p| p.profile_id.clone()) {
                aggregate.activate(&successor_id, now);
                let schedule = aggregate.find_profile(&successor_id).map(|successor| {
                    // Start fresh from the successor's window, keeping only the user's timezone
                    let mut schedule = NotificationSchedule::for_profile(successor, None, now);
                    if let Some(previous) = &previous_schedule {
                        schedule.timezone = previous.timezone.clone();
                    }
                    schedule
                });
                aggregate.fcm_schedule = schedule;
                info!(user_id, successor = %successor_id, "Activated replacement profile");
                activated_profile_id = Some(successor_id);
            }
        }

        aggregate.updated_at = Some(now);
        debug_assert!(aggregate.check_invariants().is_ok());
        self.save(&aggregate, Some(stored.version)).await?;

        let fcm_disabled = aggregate.fcm_schedule.is_none();
        info!(
            user_id,
            profile_id,
            remaining = aggregate.alarm_profiles.len(),
            fcm_disabled,
            "Profile deleted"
        );

        Ok(DeleteProfileResponse {
            deleted_profile_id: removed.profile_id,
            was_active,
            schedule_deleted,
            purged_log_count,
            remaining_profiles: aggregate.alarm_profiles.len(),
            activated_profile_id,
            fcm_disabled,
        })
    }

    async fn save(&self, aggregate: &UserAggregate, version: Option<u64>) -> Result<u64, DomainError> {
        self.storage.save_aggregate(aggregate, version).await.map_err(|e| {
            let err = DomainError::from(e);
            if err.is_retryable() {
                warn!(user_id = %aggregate.user_id, "Concurrent profile modification detected");
            }
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NotificationLogEntry, NOTIFICATION_LOG_CAPACITY};
    use crate::storage::{AggregateRepository, DbConnection};
    use shared::{DeliveryStatus, NotificationSlot, TimeOfDay};

    async fn create_test_service() -> (ProfileService, Arc<dyn AggregateStorage>) {
        let db = DbConnection::in_memory().await.expect("Failed to init test DB");
        let storage: Arc<dyn AggregateStorage> = Arc::new(AggregateRepository::new(db));
        (ProfileService::new(storage.clone()), storage)
    }

    fn t(raw: &str) -> TimeOfDay {
        raw.parse().unwrap()
    }

    fn profile_request(profile_id: &str) -> CreateOrUpdateProfileRequest {
        CreateOrUpdateProfileRequest {
            profile_id: Some(profile_id.to_string()),
            title: Some(format!("Profile {}", profile_id)),
            media_reference: Some(format!("https://media.example/{}.mp4", profile_id)),
            cadence_per_day: Some(2),
            active_weekdays: Some(vec![1, 2, 3, 4, 5]),
            window_start: Some(t("08:00")),
            window_end: Some(t("20:00")),
            ..Default::default()
        }
    }

    fn active_request(profile_id: &str) -> CreateOrUpdateProfileRequest {
        CreateOrUpdateProfileRequest {
            is_active: Some(true),
            morning_time: Some(t("07:00")),
            evening_time: Some(t("21:00")),
            timezone: Some("Europe/Berlin".to_string()),
            ..profile_request(profile_id)
        }
    }

    async fn stored(storage: &Arc<dyn AggregateStorage>, user_id: &str) -> UserAggregate {
        storage
            .load_aggregate(user_id)
            .await
            .expect("Load failed")
            .expect("Aggregate missing")
            .aggregate
    }

    #[tokio::test]
    async fn test_get_profiles_for_unknown_user_is_empty() {
        let (service, _) = create_test_service().await;
        let response = service.get_profiles("nobody").await.expect("Failed to get profiles");
        assert_eq!(response.total_count, 0);
        assert!(response.active_profiles.is_empty());
        assert!(response.inactive_profiles.is_empty());
    }

    #[tokio::test]
    async fn test_create_inactive_profile() {
        let (service, storage) = create_test_service().await;

        let response = service
            .create_or_update_profile("u1", profile_request("a"))
            .await
            .expect("Failed to create profile");

        assert!(response.created);
        assert!(!response.profile.is_active);
        assert_eq!(response.profile.user_id, "u1");
        assert!(response.schedule.is_none());

        let aggregate = stored(&storage, "u1").await;
        assert_eq!(aggregate.alarm_profiles.len(), 1);
        assert!(aggregate.fcm_schedule.is_none());
    }

    #[tokio::test]
    async fn test_update_in_place_keeps_created_at() {
        let (service, storage) = create_test_service().await;
        let first = service.create_or_update_profile("u1", profile_request("a")).await.unwrap();

        let mut update = profile_request("a");
        update.title = Some("Renamed".to_string());
        let second = service.create_or_update_profile("u1", update).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.profile.name, "Renamed");
        assert_eq!(second.profile.created_at, first.profile.created_at);
        assert!(second.profile.updated_at >= first.profile.updated_at);
        assert_eq!(stored(&storage, "u1").await.alarm_profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_activation_pivot_deactivates_everyone_else() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", active_request("a")).await.unwrap();
        service.create_or_update_profile("u1", profile_request("b")).await.unwrap();

        let response = service
            .create_or_update_profile("u1", active_request("c"))
            .await
            .expect("Failed to activate c");

        assert!(response.profile.is_active);
        let deactivated: Vec<&str> = response
            .deactivated_profiles
            .iter()
            .map(|p| p.alarm_id.as_str())
            .collect();
        assert_eq!(deactivated, vec!["a", "b"]);
        let schedule = response.schedule.expect("Schedule missing");
        assert_eq!(schedule.active_profile_id, "c");
        assert_eq!(schedule.timezone, "Europe/Berlin");

        let aggregate = stored(&storage, "u1").await;
        assert_eq!(aggregate.active_count(), 1);
        assert!(aggregate.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn test_activation_without_schedule_times_is_rejected() {
        let (service, storage) = create_test_service().await;
        let mut request = profile_request("a");
        request.is_active = Some(true);

        let err = service.create_or_update_profile("u1", request).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "morning_time"));
        assert!(storage.load_aggregate("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate_through_update_drops_schedule() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", active_request("a")).await.unwrap();

        let mut request = profile_request("a");
        request.is_active = Some(false);
        let response = service.create_or_update_profile("u1", request).await.unwrap();

        assert!(!response.profile.is_active);
        assert!(response.schedule.is_none());
        let aggregate = stored(&storage, "u1").await;
        assert!(aggregate.fcm_schedule.is_none());
        assert!(aggregate.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn test_schedule_times_update_for_active_profile() {
        let (service, _) = create_test_service().await;
        service.create_or_update_profile("u1", active_request("a")).await.unwrap();

        let mut request = profile_request("a");
        request.morning_time = Some(t("06:15"));
        request.evening_time = Some(t("22:45"));
        let response = service.create_or_update_profile("u1", request).await.unwrap();

        let schedule = response.schedule.expect("Schedule missing");
        assert_eq!(schedule.morning_time, t("06:15"));
        assert_eq!(schedule.evening_time, t("22:45"));
        assert_eq!(schedule.timezone, "UTC");
        assert!(response.profile.is_active);
    }

    #[tokio::test]
    async fn test_schedule_times_for_inactive_profile_are_rejected() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", profile_request("a")).await.unwrap();
        let before = storage.load_aggregate("u1").await.unwrap().unwrap().version;

        let mut request = profile_request("a");
        request.morning_time = Some(t("06:00"));
        request.evening_time = Some(t("22:00"));
        let err = service.create_or_update_profile("u1", request.clone()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "is_active"));

        request.is_active = Some(false);
        let err = service.create_or_update_profile("u1", request).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "is_active"));

        assert_eq!(storage.load_aggregate("u1").await.unwrap().unwrap().version, before);
        assert!(stored(&storage, "u1").await.fcm_schedule.is_none());
    }

    #[tokio::test]
    async fn test_activate_profile_carries_schedule_times() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", active_request("a")).await.unwrap();
        service.create_or_update_profile("u1", profile_request("b")).await.unwrap();

        let response = service.activate_profile("u1", "b").await.expect("Failed to activate");

        assert!(!response.already_active);
        assert!(response.profile.is_active);
        assert_eq!(response.deactivated_profiles.len(), 1);
        assert_eq!(response.schedule.active_profile_id, "b");
        assert_eq!(response.schedule.morning_time, t("07:00"));
        assert_eq!(response.schedule.timezone, "Europe/Berlin");
        assert!(stored(&storage, "u1").await.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn test_activate_without_prior_schedule_uses_window() {
        let (service, _) = create_test_service().await;
        service.create_or_update_profile("u1", profile_request("a")).await.unwrap();

        let response = service.activate_profile("u1", "a").await.unwrap();

        assert_eq!(response.schedule.morning_time, t("08:00"));
        assert_eq!(response.schedule.evening_time, t("20:00"));
        assert_eq!(response.schedule.timezone, "UTC");
    }

    #[tokio::test]
    async fn test_activate_twice_is_idempotent() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", profile_request("a")).await.unwrap();

        service.activate_profile("u1", "a").await.unwrap();
        let after_first = storage.load_aggregate("u1").await.unwrap().unwrap();

        let second = service.activate_profile("u1", "a").await.unwrap();
        let after_second = storage.load_aggregate("u1").await.unwrap().unwrap();

        assert!(second.already_active);
        assert_eq!(after_first.aggregate, after_second.aggregate);
        assert_eq!(after_first.version, after_second.version);
    }

    #[tokio::test]
    async fn test_activate_unknown_profile_or_user() {
        let (service, _) = create_test_service().await;
        assert!(matches!(
            service.activate_profile("ghost", "a").await,
            Err(DomainError::UserNotFound(_))
        ));

        service.create_or_update_profile("u1", profile_request("a")).await.unwrap();
        assert!(matches!(
            service.activate_profile("u1", "zzz").await,
            Err(DomainError::ProfileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_only_profile_disables_notifications() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", active_request("a")).await.unwrap();

        let response = service.delete_profile("u1", "a").await.expect("Failed to delete");

        assert_eq!(response.deleted_profile_id, "a");
        assert!(response.was_active);
        assert!(response.schedule_deleted);
        assert_eq!(response.remaining_profiles, 0);
        assert!(response.activated_profile_id.is_none());
        assert!(response.fcm_disabled);
        let aggregate = stored(&storage, "u1").await;
        assert!(aggregate.fcm_schedule.is_none());
        assert!(aggregate.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn test_delete_active_profile_promotes_newest_and_purges_logs() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", profile_request("old")).await.unwrap();
        service.create_or_update_profile("u1", profile_request("newer")).await.unwrap();
        service.create_or_update_profile("u1", active_request("current")).await.unwrap();

        // Seed delivery logs for the active profile and one other
        let stored_agg = storage.load_aggregate("u1").await.unwrap().unwrap();
        let mut aggregate = stored_agg.aggregate;
        for (n, profile_id) in ["current", "old", "current"].iter().enumerate() {
            let now = Utc::now();
            aggregate.push_notification_log(NotificationLogEntry {
                log_id: format!("log-{}", n),
                profile_id: profile_id.to_string(),
                slot: NotificationSlot::Morning,
                status: DeliveryStatus::Delivered,
                delivered_at: now,
                recorded_at: now,
            });
        }
        storage.save_aggregate(&aggregate, Some(stored_agg.version)).await.unwrap();

        let response = service.delete_profile("u1", "current").await.unwrap();

        assert_eq!(response.purged_log_count, 2);
        assert_eq!(response.remaining_profiles, 2);
        assert_eq!(response.activated_profile_id.as_deref(), Some("newer"));
        assert!(!response.fcm_disabled);

        let aggregate = stored(&storage, "u1").await;
        assert!(aggregate.check_invariants().is_ok());
        let schedule = aggregate.fcm_schedule.as_ref().unwrap();
        assert_eq!(schedule.active_profile_id, "newer");
        assert_eq!(schedule.morning_time, t("08:00"));
        assert_eq!(schedule.timezone, "Europe/Berlin");
        assert_eq!(aggregate.notification_logs.len(), 1);
        assert!(aggregate.notification_logs.len() <= NOTIFICATION_LOG_CAPACITY);
    }

    #[tokio::test]
    async fn test_delete_inactive_profile_leaves_schedule() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", active_request("a")).await.unwrap();
        service.create_or_update_profile("u1", profile_request("b")).await.unwrap();

        let response = service.delete_profile("u1", "b").await.unwrap();

        assert!(!response.was_active);
        assert!(!response.schedule_deleted);
        assert!(!response.fcm_disabled);
        assert_eq!(response.remaining_profiles, 1);
        let aggregate = stored(&storage, "u1").await;
        assert_eq!(aggregate.fcm_schedule.unwrap().active_profile_id, "a");
    }

    #[tokio::test]
    async fn test_delete_missing_profile_or_user() {
        let (service, _) = create_test_service().await;
        assert!(matches!(
            service.delete_profile("ghost", "a").await,
            Err(DomainError::UserNotFound(_))
        ));

        service.create_or_update_profile("u1", profile_request("a")).await.unwrap();
        assert!(matches!(
            service.delete_profile("u1", "b").await,
            Err(DomainError::ProfileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_stale_write_surfaces_as_conflict() {
        let (service, storage) = create_test_service().await;
        service.create_or_update_profile("u1", profile_request("a")).await.unwrap();

        // Another device writes between our read and write
        let stale = storage.load_aggregate("u1").await.unwrap().unwrap();
        service.activate_profile("u1", "a").await.unwrap();
        let result = storage.save_aggregate(&stale.aggregate, Some(stale.version)).await;

        let err = DomainError::from(result.unwrap_err());
        assert!(err.is_retryable());
        assert!(stored(&storage, "u1").await.check_invariants().is_ok());
    }
}
