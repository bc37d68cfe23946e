pub mod aggregate;
pub mod logs;
pub mod profile;
pub mod schedule;

pub use aggregate::{UserAggregate, NOTIFICATION_LOG_CAPACITY, SYNC_HEALTH_LOG_CAPACITY};
pub use logs::{NotificationLogEntry, SyncHealthEntry, SyncMetricsSnapshot};
pub use profile::{AlarmProfile, Cadence, TimeWindow};
pub use schedule::{NotificationSchedule, DEFAULT_TIMEZONE};
