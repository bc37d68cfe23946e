//! Domain model for an alarm profile.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::TimeOfDay;
use std::collections::BTreeSet;

/// Daily window in which reminders may fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// How often and when a profile's reminders recur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cadence {
    pub per_day: u32,
    /// ISO weekdays, 1 = Monday ... 7 = Sunday
    pub weekdays: BTreeSet<u8>,
    pub window: TimeWindow,
    /// Fires once at this time instead of spreading across the window
    pub fixed_time: Option<TimeOfDay>,
    /// Explicit calendar dates, in the order the caller supplied them
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmProfile {
    pub profile_id: String,
    pub title: String,
    pub media_reference: String,
    pub cadence: Cadence,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlarmProfile {
    pub fn is_valid_weekday(day: u8) -> bool {
        (1..=7).contains(&day)
    }
}
