use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Time of day with minute precision. Travels over the wire as "HH:MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeOfDayError {
    #[error("invalid time of day '{0}', expected HH:MM")]
    Malformed(String),
    #[error("time of day out of range: {hour}:{minute}")]
    OutOfRange { hour: u32, minute: u32 },
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeOfDayError> {
        if hour > 23 || minute > 59 {
            return Err(TimeOfDayError::OutOfRange { hour, minute });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeOfDayError::Malformed(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(malformed)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(malformed());
        }
        let hour: u32 = hour.parse().map_err(|_| malformed())?;
        let minute: u32 = minute.parse().map_err(|_| malformed())?;
        Self::new(hour, minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Flat alarm profile shape served to older API consumers.
///
/// The backend keeps a nested internal model; this is a view over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyProfile {
    pub user_id: String,
    /// Caller-supplied profile identifier, unique per user
    pub alarm_id: String,
    pub name: String,
    /// Opaque media reference (usually a video URL)
    pub video_url: String,
    pub frequency_per_day: u32,
    /// ISO weekdays, 1 = Monday ... 7 = Sunday, ascending
    pub days_of_week: Vec<u8>,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub exact_time: Option<TimeOfDay>,
    pub specific_dates: Vec<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationScheduleDto {
    pub active_profile_id: String,
    pub morning_time: TimeOfDay,
    pub evening_time: TimeOfDay,
    /// IANA timezone name
    pub timezone: String,
    pub is_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

/// Create or update a profile. Every field is optional on the wire so that
/// validation can name exactly which required field is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateOrUpdateProfileRequest {
    pub profile_id: Option<String>,
    pub title: Option<String>,
    pub media_reference: Option<String>,
    pub cadence_per_day: Option<u32>,
    pub active_weekdays: Option<Vec<u8>>,
    pub window_start: Option<TimeOfDay>,
    pub window_end: Option<TimeOfDay>,
    pub fixed_time: Option<TimeOfDay>,
    pub dates: Option<Vec<NaiveDate>>,
    /// `Some(true)` makes this the active profile, `Some(false)` deactivates it,
    /// `None` leaves activation untouched.
    pub is_active: Option<bool>,
    pub morning_time: Option<TimeOfDay>,
    pub evening_time: Option<TimeOfDay>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrUpdateProfileResponse {
    pub profile: LegacyProfile,
    pub created: bool,
    /// Profiles switched off as a side effect of this call
    pub deactivated_profiles: Vec<LegacyProfile>,
    pub schedule: Option<NotificationScheduleDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivateProfileResponse {
    pub profile: LegacyProfile,
    pub deactivated_profiles: Vec<LegacyProfile>,
    pub schedule: NotificationScheduleDto,
    /// True when the profile was already active and nothing was written
    pub already_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetProfilesResponse {
    pub active_profiles: Vec<LegacyProfile>,
    pub inactive_profiles: Vec<LegacyProfile>,
    pub active_count: usize,
    pub inactive_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteProfileResponse {
    pub deleted_profile_id: String,
    pub was_active: bool,
    pub schedule_deleted: bool,
    pub purged_log_count: usize,
    pub remaining_profiles: usize,
    /// Profile activated automatically to replace the deleted active one
    pub activated_profile_id: Option<String>,
    pub fcm_disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Battery percentage, 0-100
    pub battery_level: Option<u8>,
    pub low_power_mode: Option<bool>,
    /// e.g. "wifi", "cellular", "offline"
    pub network_type: Option<String>,
    pub app_version: Option<String>,
    pub os_version: Option<String>,
}

/// Client-side sync counters for one reporting window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncMetrics {
    pub success_count: Option<u32>,
    pub failure_count: Option<u32>,
    pub average_latency_ms: Option<f64>,
    pub pending_changes: Option<u32>,
    pub last_successful_sync: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSyncHealthRequest {
    pub device_id: Option<String>,
    pub device_state: Option<DeviceState>,
    pub sync_metrics: Option<SyncMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSyncHealthResponse {
    pub health_score: u8,
    pub status: HealthStatus,
    pub recommendations: Vec<String>,
    /// Server-suggested time for the client to check in again
    pub next_sync_check_time: DateTime<Utc>,
    pub retained_entries: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatusRequest {
    pub device_id: Option<String>,
    pub last_sync_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntity {
    Profile,
    Schedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Updated,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeDescriptor {
    pub entity: SyncEntity,
    pub entity_id: Option<String>,
    pub change: ChangeKind,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryActionKind {
    ResyncProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryAction {
    pub action: RecoveryActionKind,
    pub profile_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatusResponse {
    pub needs_sync: bool,
    pub reason: String,
    pub profile_changes: Vec<ChangeDescriptor>,
    pub schedule_update: Option<NotificationScheduleDto>,
    pub recovery_actions: Vec<RecoveryAction>,
    pub server_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSlot {
    Morning,
    Evening,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordNotificationRequest {
    pub profile_id: Option<String>,
    pub slot: Option<NotificationSlot>,
    /// Defaults to `delivered`
    pub status: Option<DeliveryStatus>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordNotificationResponse {
    pub log_id: Option<String>,
    /// True when an identical report was seen recently and nothing was appended
    pub deduplicated: bool,
    pub retained_entries: usize,
}

/// Error body returned by the REST layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
    pub field: Option<String>,
}
