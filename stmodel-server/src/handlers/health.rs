//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use stmodel_core::constants::{APP_NAME, APP_VERSION};
use crate::AppState;

#[derive(Serialize)]
pub struct ServiceBanner {
    service: &'static str,
    version: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    database: bool,
    redis: bool,
    environment: String,
    version: &'static str,
    timestamp: i64,
}

pub async fn root() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        service: APP_NAME,
        version: APP_VERSION,
        status: "running",
    })
}

/// `healthy` once the model is loaded, `degraded` before
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.context.is_ready();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" },
        model_loaded,
        database: state.store.is_some(),
        redis: state.publisher.is_some(),
        environment: state.config.environment.clone(),
        version: APP_VERSION,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
