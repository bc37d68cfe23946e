//! # Domain Module
//!
//! Business rules for alarm profiles and device sync.
//!
//! Every operation follows the same shape: validate the request into a
//! command, load the user's aggregate, mutate it in memory, then save it with
//! the version it was loaded at. A failed validation or a lost race leaves the
//! stored aggregate untouched.
//!
//! ## Services
//!
//! - **ProfileService**: create, update, activate and delete profiles while
//!   keeping exactly one schedule pointed at the single active profile
//! - **SyncHealthService**: score device sync reports into the health log
//! - **SyncStatusService**: tell a device what changed since its last sync and
//!   whether it should resync after repeated failures
//! - **NotificationLogService**: record push deliveries, dropping transport retries

pub mod commands;
pub mod delivery_dedup;
pub mod errors;
pub mod models;
pub mod notification_log_service;
pub mod profile_service;
pub mod sync_health_service;
pub mod sync_status_service;

pub use delivery_dedup::{DeliveryDedupCache, DeliveryKey};
pub use errors::DomainError;
pub use notification_log_service::NotificationLogService;
pub use profile_service::ProfileService;
pub use sync_health_service::{assess_sync_health, HealthAssessment, SyncHealthService};
pub use sync_status_service::{detect_failure_pattern, FailurePattern, SyncStatusService};
