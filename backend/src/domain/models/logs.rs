//! Append-only log entries kept inside the user aggregate.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{DeliveryStatus, DeviceState, HealthStatus, NotificationSlot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationLogEntry {
    pub log_id: String,
    pub profile_id: String,
    pub slot: NotificationSlot,
    pub status: DeliveryStatus,
    pub delivered_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

/// Counters from one client reporting window, after validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMetricsSnapshot {
    pub success_count: u32,
    pub failure_count: u32,
    pub average_latency_ms: Option<f64>,
    pub pending_changes: Option<u32>,
    pub last_successful_sync: Option<DateTime<Utc>>,
}

impl SyncMetricsSnapshot {
    pub fn total(&self) -> u32 {
        self.success_count.saturating_add(self.failure_count)
    }

    /// Share of attempts that failed; zero when nothing was attempted.
    pub fn failure_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.failure_count as f64 / total as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncHealthEntry {
    pub entry_id: String,
    pub device_id: String,
    pub recorded_at: DateTime<Utc>,
    pub health_score: u8,
    pub status: HealthStatus,
    pub sync_metrics: SyncMetricsSnapshot,
    pub device_state: Option<DeviceState>,
    pub recommendations: Vec<String>,
}
