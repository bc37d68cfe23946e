//! Sync health recording.
//!
//! Turns a device's sync counters for one reporting window into a 0-100 health
//! score, a status bucket and a few advisory recommendations, then appends the
//! result to the user's rotating health log.
//!
//! Scoring starts at 100 and subtracts:
//!
//! - `failure_ratio * failure_ratio_weight`
//! - a flat penalty when failures outnumber successes
//! - a smaller flat penalty when average latency exceeds the threshold
//!
//! Device state never changes the score; it only adds recommendations.

use chrono::{DateTime, Duration, Utc};
use shared::{DeviceState, HealthStatus, RecordSyncHealthRequest, RecordSyncHealthResponse};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{HealthScoringConfig, MAX_NEXT_CHECK_HOURS};
use crate::domain::commands::sync::RecordSyncHealthCommand;
use crate::domain::errors::DomainError;
use crate::domain::models::{SyncHealthEntry, SyncMetricsSnapshot};
use crate::storage::AggregateStorage;

const LOW_BATTERY_PERCENT: u8 = 15;

/// Outcome of scoring one report
#[derive(Debug, Clone, PartialEq)]
pub struct HealthAssessment {
    pub health_score: u8,
    pub status: HealthStatus,
    pub recommendations: Vec<String>,
}

pub fn classify(score: u8, config: &HealthScoringConfig) -> HealthStatus {
    if score >= config.healthy_threshold {
        HealthStatus::Healthy
    } else if score >= config.warning_threshold {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

/// Score a report. Pure; the recorder persists the result.
pub fn assess_sync_health(
    metrics: &SyncMetricsSnapshot,
    device_state: Option<&DeviceState>,
    config: &HealthScoringConfig,
) -> HealthAssessment {
    let mut score = 100.0;
    let mut recommendations = Vec::new();

    if metrics.total() == 0 {
        recommendations.push("no sync attempts reported in this window".to_string());
    }

    let ratio = metrics.failure_ratio();
    if metrics.failure_count > 0 {
        score -= ratio * config.failure_ratio_weight;
        if ratio >= 0.5 {
            recommendations.push("high failure rate detected".to_string());
        } else {
            recommendations.push("intermittent sync failures detected".to_string());
        }
    }

    if metrics.failure_count > metrics.success_count {
        score -= config.failures_exceed_successes_penalty;
        recommendations.push("failures exceed successes; consider a full profile resync".to_string());
    }

    if let Some(latency) = metrics.average_latency_ms {
        if latency > config.latency_threshold_ms {
            score -= config.latency_penalty;
            recommendations.push("elevated sync latency".to_string());
        }
    }

    if let Some(state) = device_state {
        if state.low_power_mode == Some(true) {
            recommendations.push("device in low power mode; background sync may be deferred".to_string());
        }
        if matches!(state.battery_level, Some(level) if level < LOW_BATTERY_PERCENT) {
            recommendations.push("low battery may delay background sync".to_string());
        }
        if state
            .network_type
            .as_deref()
            .map(|n| n.eq_ignore_ascii_case("offline") || n.eq_ignore_ascii_case("none"))
            .unwrap_or(false)
        {
            recommendations.push("device reported no network connectivity".to_string());
        }
    }

    let health_score = f64::clamp(score, 0.0, 100.0).round() as u8;
    HealthAssessment {
        health_score,
        status: classify(health_score, config),
        recommendations,
    }
}

/// Service that records client-reported sync health
#[derive(Clone)]
pub struct SyncHealthService {
    storage: Arc<dyn AggregateStorage>,
    config: HealthScoringConfig,
}

impl SyncHealthService {
    pub fn new(storage: Arc<dyn AggregateStorage>, config: HealthScoringConfig) -> Self {
        Self { storage, config }
    }

    pub async fn record_sync_health(
        &self,
        user_id: &str,
        request: RecordSyncHealthRequest,
    ) -> Result<RecordSyncHealthResponse, DomainError> {
        let command = RecordSyncHealthCommand::try_from(request)?;
        self.record_at(user_id, command, Utc::now()).await
    }

    async fn record_at(
        &self,
        user_id: &str,
        command: RecordSyncHealthCommand,
        now: DateTime<Utc>,
    ) -> Result<RecordSyncHealthResponse, DomainError> {
        info!(user_id, device_id = %command.device_id, "Recording sync health");

        let assessment = assess_sync_health(&command.metrics, command.device_state.as_ref(), &self.config);

        let (mut aggregate, version) = self.storage.load_or_new(user_id).await?;
        aggregate.push_sync_health(SyncHealthEntry {
            entry_id: uuid::Uuid::new_v4().to_string(),
            device_id: command.device_id.clone(),
            recorded_at: now,
            health_score: assessment.health_score,
            status: assessment.status,
            sync_metrics: command.metrics,
            device_state: command.device_state,
            recommendations: assessment.recommendations.clone(),
        });

        self.storage.save_aggregate(&aggregate, version).await.map_err(|e| {
            let err = DomainError::from(e);
            if err.is_retryable() {
                warn!(user_id, "Concurrent write while recording sync health");
            }
            err
        })?;

        if assessment.status == HealthStatus::Critical {
            warn!(user_id, device_id = %command.device_id, score = assessment.health_score, "Device sync health is critical");
        } else {
            info!(user_id, device_id = %command.device_id, score = assessment.health_score, status = %assessment.status, "Sync health recorded");
        }

        Ok(RecordSyncHealthResponse {
            health_score: assessment.health_score,
            status: assessment.status,
            recommendations: assessment.recommendations,
            next_sync_check_time: now + Duration::hours(self.config.next_check_hours.clamp(1, MAX_NEXT_CHECK_HOURS)),
            retained_entries: aggregate.sync_health_logs.len(),
        })
    }
}
