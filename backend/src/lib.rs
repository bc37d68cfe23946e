//! # Alarm Sync Backend
//!
//! Server side of a multi-device alarm app: per-user alarm profiles, the one
//! notification schedule that follows the active profile, and the sync health
//! bookkeeping devices report into.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (axum REST handlers)
//!     ↓
//! Domain Layer (services, commands, aggregate rules)
//!     ↓        ↘
//! Storage Layer   Mappers (internal model → API shapes)
//! ```
//!
//! All of a user's state is a single versioned document, so every operation
//! commits atomically or not at all, and concurrent writers for the same user
//! get a retryable conflict instead of silently overwriting each other.

pub mod config;
pub mod domain;
pub mod io;
pub mod mappers;
pub mod storage;

use axum::{
    http::Method,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{
    DeliveryDedupCache, NotificationLogService, ProfileService, SyncHealthService, SyncStatusService,
};
use crate::storage::{AggregateRepository, AggregateStorage, DbConnection};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub profile_service: ProfileService,
    pub sync_health_service: SyncHealthService,
    pub sync_status_service: SyncStatusService,
    pub notification_log_service: NotificationLogService,
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> anyhow::Result<AppState> {
    info!(database_url = %config.database_url, "Setting up database");
    let db_conn = DbConnection::new(&config.database_url).await?;
    let storage: Arc<dyn AggregateStorage> = Arc::new(AggregateRepository::new(db_conn));

    Ok(build_state(storage, config))
}

/// Wire the services over an existing storage backend
pub fn build_state(storage: Arc<dyn AggregateStorage>, config: &AppConfig) -> AppState {
    info!("Setting up domain services");
    let dedup = Arc::new(DeliveryDedupCache::from_config(&config.delivery_dedup));

    AppState {
        profile_service: ProfileService::new(storage.clone()),
        sync_health_service: SyncHealthService::new(storage.clone(), config.health.clone()),
        sync_status_service: SyncStatusService::new(storage.clone(), config.sync.clone()),
        notification_log_service: NotificationLogService::new(storage, dedup),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/profiles", get(io::get_profiles).put(io::create_or_update_profile))
        .route("/profiles/:profile_id", delete(io::delete_profile))
        .route("/profiles/:profile_id/activate", post(io::activate_profile))
        .route("/sync/health", post(io::record_sync_health))
        .route("/sync/status", get(io::get_sync_status))
        .route("/notifications/logs", post(io::record_notification));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
