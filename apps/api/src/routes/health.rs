use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::cache::CacheStatus;
use crate::config::APP_NAME;
use crate::db;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: &'static str,
    pub database: DatabaseStatus,
    pub redis: CacheStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub health: &'static str,
    pub api_v1: &'static str,
}

/// GET /health
/// Database drives the overall status; the cache is reported but never degrades it.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = if db::ping(&state.db).await {
        DatabaseStatus::Healthy
    } else {
        warn!("database health check failed");
        DatabaseStatus::Unhealthy
    };
    let redis = state.cache.ping().await;

    let status = match database {
        DatabaseStatus::Healthy => ServiceStatus::Healthy,
        DatabaseStatus::Unhealthy => ServiceStatus::Degraded,
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database,
        redis,
        timestamp: Utc::now(),
    })
}

/// GET /
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        name: APP_NAME,
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
        api_v1: "/api/v1",
    })
}
