//! The per-user aggregate: every profile, the schedule and both rotating logs.
//!
//! All lifecycle rules that span sub-entities live here as plain methods so a
//! service can apply them to one loaded copy and persist the result in a single
//! versioned write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::logs::{NotificationLogEntry, SyncHealthEntry};
use super::profile::AlarmProfile;
use super::schedule::NotificationSchedule;

pub const NOTIFICATION_LOG_CAPACITY: usize = 100;
pub const SYNC_HEALTH_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAggregate {
    pub user_id: String,
    pub alarm_profiles: Vec<AlarmProfile>,
    pub fcm_schedule: Option<NotificationSchedule>,
    /// Oldest first
    pub notification_logs: Vec<NotificationLogEntry>,
    /// Oldest first
    pub sync_health_logs: Vec<SyncHealthEntry>,
    /// Last profile or schedule mutation; health and delivery logs don't touch it
    pub updated_at: Option<DateTime<Utc>>,
    /// When the schedule was last dropped without a replacement
    #[serde(default)]
    pub schedule_removed_at: Option<DateTime<Utc>>,
}

/// Append `entry` and drop the oldest entries beyond `capacity`.
fn push_bounded<T>(log: &mut Vec<T>, entry: T, capacity: usize) {
    log.push(entry);
    if log.len() > capacity {
        let excess = log.len() - capacity;
        log.drain(..excess);
    }
}

impl UserAggregate {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            alarm_profiles: Vec::new(),
            fcm_schedule: None,
            notification_logs: Vec::new(),
            sync_health_logs: Vec::new(),
            updated_at: None,
            schedule_removed_at: None,
        }
    }

    pub fn find_profile(&self, profile_id: &str) -> Option<&AlarmProfile> {
        self.alarm_profiles.iter().find(|p| p.profile_id == profile_id)
    }

    pub fn find_profile_mut(&mut self, profile_id: &str) -> Option<&mut AlarmProfile> {
        self.alarm_profiles.iter_mut().find(|p| p.profile_id == profile_id)
    }

    pub fn active_profile(&self) -> Option<&AlarmProfile> {
        self.alarm_profiles.iter().find(|p| p.is_active)
    }

    pub fn active_count(&self) -> usize {
        self.alarm_profiles.iter().filter(|p| p.is_active).count()
    }

    /// Make `profile_id` the only active profile.
    ///
    /// Returns every other profile, as it looks afterwards. Only profiles that
    /// were actually switched off get a new `updated_at`. The caller is
    /// responsible for rewriting the schedule in the same write.
    pub fn activate(&mut self, profile_id: &str, now: DateTime<Utc>) -> Vec<AlarmProfile> {
        let mut deactivated = Vec::new();
        for profile in self.alarm_profiles.iter_mut() {
            if profile.profile_id == profile_id {
                if !profile.is_active {
                    profile.is_active = true;
                    profile.updated_at = now;
                }
                continue;
            }
            if profile.is_active {
                profile.is_active = false;
                profile.updated_at = now;
            }
            deactivated.push(profile.clone());
        }
        deactivated
    }

    /// Switch off `profile_id` and drop the schedule that pointed at it.
    pub fn deactivate(&mut self, profile_id: &str, now: DateTime<Utc>) -> bool {
        let Some(profile) = self.find_profile_mut(profile_id) else {
            return false;
        };
        if !profile.is_active {
            return false;
        }
        profile.is_active = false;
        profile.updated_at = now;
        self.clear_schedule(now);
        true
    }

    /// Drop the schedule, remembering when it went.
    pub fn clear_schedule(&mut self, now: DateTime<Utc>) -> Option<NotificationSchedule> {
        let previous = self.fcm_schedule.take();
        if previous.is_some() {
            self.schedule_removed_at = Some(now);
        }
        previous
    }

    /// Remaining profile that takes over when the active one is deleted:
    /// the most recently created, ties going to the later position.
    pub fn successor_candidate(&self) -> Option<&AlarmProfile> {
        self.alarm_profiles.iter().max_by_key(|p| p.created_at)
    }

    /// Remove every notification log entry for `profile_id`, returning how many went.
    pub fn purge_notification_logs(&mut self, profile_id: &str) -> usize {
        let before = self.notification_logs.len();
        self.notification_logs.retain(|entry| entry.profile_id != profile_id);
        before - self.notification_logs.len()
    }

    pub fn push_notification_log(&mut self, entry: NotificationLogEntry) {
        push_bounded(&mut self.notification_logs, entry, NOTIFICATION_LOG_CAPACITY);
    }

    pub fn push_sync_health(&mut self, entry: SyncHealthEntry) {
        push_bounded(&mut self.sync_health_logs, entry, SYNC_HEALTH_LOG_CAPACITY);
    }

    /// Most recent `count` health entries, newest first
    pub fn recent_sync_health(&self, count: usize) -> impl Iterator<Item = &SyncHealthEntry> {
        self.sync_health_logs.iter().rev().take(count)
    }

    /// Check the single-active-profile and schedule-iff-active rules.
    pub fn check_invariants(&self) -> Result<(), String> {
        let active: Vec<&AlarmProfile> = self.alarm_profiles.iter().filter(|p| p.is_active).collect();
        if active.len() > 1 {
            return Err(format!(
                "user {} has {} active profiles",
                self.user_id,
                active.len()
            ));
        }
        match (active.first(), &self.fcm_schedule) {
            (Some(profile), Some(schedule)) if schedule.active_profile_id != profile.profile_id => Err(format!(
                "schedule points at {} but active profile is {}",
                schedule.active_profile_id, profile.profile_id
            )),
            (Some(profile), None) => Err(format!(
                "active profile {} has no schedule",
                profile.profile_id
            )),
            (None, Some(schedule)) => Err(format!(
                "schedule for {} exists without an active profile",
                schedule.active_profile_id
            )),
            _ => Ok(()),
        }
    }
}
