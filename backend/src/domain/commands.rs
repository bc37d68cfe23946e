//! Domain-level command types.
//!
//! Public request DTOs from the `shared` crate carry every field as optional.
//! Converting them into these commands is where required fields are checked,
//! so a command that exists is always complete and well-formed.

pub mod profiles {
    use std::collections::BTreeSet;

    use shared::{CreateOrUpdateProfileRequest, TimeOfDay};

    use crate::domain::errors::DomainError;
    use crate::domain::models::{AlarmProfile, Cadence, TimeWindow};

    /// Times the notification schedule should fire at
    #[derive(Debug, Clone, PartialEq)]
    pub struct ScheduleSettings {
        pub morning_time: TimeOfDay,
        pub evening_time: TimeOfDay,
        pub timezone: Option<String>,
    }

    /// Validated input for creating or updating a profile.
    #[derive(Debug, Clone, PartialEq)]
    pub struct UpsertProfileCommand {
        pub profile_id: String,
        pub title: String,
        pub media_reference: String,
        pub cadence: Cadence,
        pub requested_active: Option<bool>,
        pub schedule: Option<ScheduleSettings>,
    }

    fn required_text(value: Option<String>, field: &str) -> Result<String, DomainError> {
        let value = value.ok_or_else(|| DomainError::missing(field))?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(field, "cannot be empty"));
        }
        Ok(trimmed.to_string())
    }

    impl TryFrom<CreateOrUpdateProfileRequest> for UpsertProfileCommand {
        type Error = DomainError;

        fn try_from(request: CreateOrUpdateProfileRequest) -> Result<Self, Self::Error> {
            let profile_id = required_text(request.profile_id, "profile_id")?;
            let media_reference = required_text(request.media_reference, "media_reference")?;
            let title = required_text(request.title, "title")?;

            let per_day = request
                .cadence_per_day
                .ok_or_else(|| DomainError::missing("cadence_per_day"))?;
            if per_day == 0 {
                return Err(DomainError::validation("cadence_per_day", "must be positive"));
            }

            let weekdays = request
                .active_weekdays
                .ok_or_else(|| DomainError::missing("active_weekdays"))?;
            if weekdays.is_empty() {
                return Err(DomainError::validation("active_weekdays", "cannot be empty"));
            }
            if let Some(bad) = weekdays.iter().find(|d| !AlarmProfile::is_valid_weekday(**d)) {
                return Err(DomainError::validation(
                    "active_weekdays",
                    format!("{} is not a weekday between 1 and 7", bad),
                ));
            }

            let start = request
                .window_start
                .ok_or_else(|| DomainError::missing("window_start"))?;
            let end = request
                .window_end
                .ok_or_else(|| DomainError::missing("window_end"))?;

            let wants_schedule = request.is_active == Some(true)
                || request.morning_time.is_some()
                || request.evening_time.is_some()
                || request.timezone.is_some();
            let schedule = if wants_schedule {
                let morning_time = request
                    .morning_time
                    .ok_or_else(|| DomainError::missing("morning_time"))?;
                let evening_time = request
                    .evening_time
                    .ok_or_else(|| DomainError::missing("evening_time"))?;
                let timezone = match request.timezone {
                    Some(tz) if tz.trim().is_empty() => {
                        return Err(DomainError::validation("timezone", "cannot be empty"))
                    }
                    Some(tz) => Some(tz.trim().to_string()),
                    None => None,
                };
                Some(ScheduleSettings {
                    morning_time,
                    evening_time,
                    timezone,
                })
            } else {
                None
            };

            Ok(Self {
                profile_id,
                title,
                media_reference,
                cadence: Cadence {
                    per_day,
                    weekdays: weekdays.into_iter().collect::<BTreeSet<u8>>(),
                    window: TimeWindow { start, end },
                    fixed_time: request.fixed_time,
                    dates: request.dates.unwrap_or_default(),
                },
                requested_active: request.is_active,
                schedule,
            })
        }
    }
}

pub mod sync {
    use chrono::{DateTime, Utc};
    use shared::{DeviceState, RecordSyncHealthRequest, SyncStatusRequest};

    use crate::domain::errors::DomainError;
    use crate::domain::models::SyncMetricsSnapshot;

    fn required_device_id(device_id: Option<String>) -> Result<String, DomainError> {
        match device_id {
            Some(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            Some(_) => Err(DomainError::validation("device_id", "cannot be empty")),
            None => Err(DomainError::missing("device_id")),
        }
    }

    /// Validated health report from one device.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordSyncHealthCommand {
        pub device_id: String,
        pub device_state: Option<DeviceState>,
        pub metrics: SyncMetricsSnapshot,
    }

    impl TryFrom<RecordSyncHealthRequest> for RecordSyncHealthCommand {
        type Error = DomainError;

        fn try_from(request: RecordSyncHealthRequest) -> Result<Self, Self::Error> {
            let device_id = required_device_id(request.device_id)?;
            let metrics = request
                .sync_metrics
                .ok_or_else(|| DomainError::missing("sync_metrics"))?;
            let success_count = metrics
                .success_count
                .ok_or_else(|| DomainError::missing("sync_metrics.success_count"))?;
            let failure_count = metrics
                .failure_count
                .ok_or_else(|| DomainError::missing("sync_metrics.failure_count"))?;
            if let Some(latency) = metrics.average_latency_ms {
                if !latency.is_finite() || latency < 0.0 {
                    return Err(DomainError::validation(
                        "sync_metrics.average_latency_ms",
                        "must be a non-negative number",
                    ));
                }
            }

            Ok(Self {
                device_id,
                device_state: request.device_state,
                metrics: SyncMetricsSnapshot {
                    success_count,
                    failure_count,
                    average_latency_ms: metrics.average_latency_ms,
                    pending_changes: metrics.pending_changes,
                    last_successful_sync: metrics.last_successful_sync,
                },
            })
        }
    }

    /// Validated sync-status check.
    #[derive(Debug, Clone, PartialEq)]
    pub struct SyncStatusQuery {
        pub device_id: String,
        pub last_sync_time: Option<DateTime<Utc>>,
    }

    impl TryFrom<SyncStatusRequest> for SyncStatusQuery {
        type Error = DomainError;

        fn try_from(request: SyncStatusRequest) -> Result<Self, Self::Error> {
            Ok(Self {
                device_id: required_device_id(request.device_id)?,
                last_sync_time: request.last_sync_time,
            })
        }
    }
}

pub mod notifications {
    use chrono::{DateTime, Utc};
    use shared::{DeliveryStatus, NotificationSlot, RecordNotificationRequest};

    use crate::domain::errors::DomainError;

    /// Validated delivery report from the push transport.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordNotificationCommand {
        pub profile_id: String,
        pub slot: NotificationSlot,
        pub status: DeliveryStatus,
        pub delivered_at: Option<DateTime<Utc>>,
    }

    impl TryFrom<RecordNotificationRequest> for RecordNotificationCommand {
        type Error = DomainError;

        fn try_from(request: RecordNotificationRequest) -> Result<Self, Self::Error> {
            let profile_id = match request.profile_id {
                Some(id) if !id.trim().is_empty() => id.trim().to_string(),
                Some(_) => return Err(DomainError::validation("profile_id", "cannot be empty")),
                None => return Err(DomainError::missing("profile_id")),
            };
            let slot = request.slot.ok_or_else(|| DomainError::missing("slot"))?;
            Ok(Self {
                profile_id,
                slot,
                status: request.status.unwrap_or(DeliveryStatus::Delivered),
                delivered_at: request.delivered_at,
            })
        }
    }
}
