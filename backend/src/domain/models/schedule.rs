//! Domain model for the per-user notification schedule.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::TimeOfDay;

use super::profile::AlarmProfile;

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Push schedule driven by the active profile. Exists only while a profile is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSchedule {
    pub active_profile_id: String,
    pub morning_time: TimeOfDay,
    pub evening_time: TimeOfDay,
    pub timezone: String,
    pub is_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl NotificationSchedule {
    pub fn new(
        active_profile_id: &str,
        morning_time: TimeOfDay,
        evening_time: TimeOfDay,
        timezone: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            active_profile_id: active_profile_id.to_string(),
            morning_time,
            evening_time,
            timezone: timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            is_enabled: true,
            updated_at: now,
        }
    }

    /// Schedule for a profile activated without explicit times.
    ///
    /// Times and timezone carry over from `previous` when there is one, otherwise
    /// the profile's window bounds become the morning and evening times.
    pub fn for_profile(
        profile: &AlarmProfile,
        previous: Option<&NotificationSchedule>,
        now: DateTime<Utc>,
    ) -> Self {
        match previous {
            Some(previous) => Self::new(
                &profile.profile_id,
                previous.morning_time,
                previous.evening_time,
                Some(previous.timezone.clone()),
                now,
            ),
            None => Self::new(
                &profile.profile_id,
                profile.cadence.window.start,
                profile.cadence.window.end,
                None,
                now,
            ),
        }
    }
}
