use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::info;
use utoipa::ToSchema;

use crate::state::AppState;

/// Application health status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Application metrics
#[derive(Debug, Clone)]
pub struct AppMetrics {
    pub start_time: Instant,
    pub total_requests: Arc<RwLock<u64>>,
    pub successful_requests: Arc<RwLock<u64>>,
    pub failed_requests: Arc<RwLock<u64>>,
    pub events_created: Arc<RwLock<u64>>,
    pub registrations_created: Arc<RwLock<u64>>,
    pub notifications_created: Arc<RwLock<u64>>,
    pub emails_sent: Arc<RwLock<u64>>,
    pub emails_failed: Arc<RwLock<u64>>,
    pub reminder_runs: Arc<RwLock<u64>>,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            total_requests: Arc::new(RwLock::new(0)),
            successful_requests: Arc::new(RwLock::new(0)),
            failed_requests: Arc::new(RwLock::new(0)),
            events_created: Arc::new(RwLock::new(0)),
            registrations_created: Arc::new(RwLock::new(0)),
            notifications_created: Arc::new(RwLock::new(0)),
            emails_sent: Arc::new(RwLock::new(0)),
            emails_failed: Arc::new(RwLock::new(0)),
            reminder_runs: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn increment_requests(&self) {
        *self.total_requests.write().await += 1;
    }

    pub async fn increment_success(&self) {
        *self.successful_requests.write().await += 1;
    }

    pub async fn increment_failure(&self) {
        *self.failed_requests.write().await += 1;
    }

    pub async fn increment_events(&self) {
        *self.events_created.write().await += 1;
    }

    pub async fn increment_registrations(&self) {
        *self.registrations_created.write().await += 1;
    }

    pub async fn increment_notifications(&self) {
        *self.notifications_created.write().await += 1;
    }

    pub async fn increment_emails_sent(&self) {
        *self.emails_sent.write().await += 1;
    }

    pub async fn increment_emails_failed(&self) {
        *self.emails_failed.write().await += 1;
    }

    pub async fn increment_reminder_runs(&self) {
        *self.reminder_runs.write().await += 1;
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Count every request and whether it ended below 400.
pub async fn track_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.metrics.increment_requests().await;
    let response = next.run(request).await;
    if response.status().is_client_error() || response.status().is_server_error() {
        state.metrics.increment_failure().await;
    } else {
        state.metrics.increment_success().await;
    }
    response
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthStatus)),
    tag = "Health"
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.metrics.uptime_seconds();

    let health = HealthStatus {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
    };

    info!("Health check requested - uptime: {}s", uptime);
    (StatusCode::OK, Json(health))
}

/// Metrics endpoint handler
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub events_created: u64,
    pub registrations_created: u64,
    pub notifications_created: u64,
    pub emails_sent: u64,
    pub emails_failed: u64,
    pub reminder_runs: u64,
    pub success_rate: f64,
}

#[utoipa::path(
    get,
    path = "/api/metrics",
    responses((status = 200, description = "Service counters", body = MetricsResponse)),
    tag = "Health"
)]
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.metrics;
    let total = *metrics.total_requests.read().await;
    let success = *metrics.successful_requests.read().await;

    let success_rate = if total > 0 {
        (success as f64 / total as f64) * 100.0
    } else {
        100.0
    };

    let response = MetricsResponse {
        uptime_seconds: metrics.uptime_seconds(),
        total_requests: total,
        successful_requests: success,
        failed_requests: *metrics.failed_requests.read().await,
        events_created: *metrics.events_created.read().await,
        registrations_created: *metrics.registrations_created.read().await,
        notifications_created: *metrics.notifications_created.read().await,
        emails_sent: *metrics.emails_sent.read().await,
        emails_failed: *metrics.emails_failed.read().await,
        reminder_runs: *metrics.reminder_runs.read().await,
        success_rate,
    };

    (StatusCode::OK, Json(response))
}

/// Initialize tracing subscriber for structured logging
pub fn init_tracing() {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "campus_events=info,tower_http=info".to_string());

    let filter_clone = filter.clone();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .json()
        .init();

    info!("Tracing initialized with filter: {}", filter_clone);
}
