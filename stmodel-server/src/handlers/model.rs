//! Model info handler

use axum::{extract::State, Json};
use serde::Serialize;

use stmodel_core::logic::model::{EngineStatus, ModelInfo, ModelMetadata};
use crate::{AppState, AppResult, AppError};

#[derive(Serialize)]
pub struct ModelInfoResponse {
    #[serde(flatten)]
    info: ModelInfo,
    metadata: ModelMetadata,
    engine_status: EngineStatus,
}

pub async fn info(State(state): State<AppState>) -> AppResult<Json<ModelInfoResponse>> {
    let info = state.context.model_info().ok_or(AppError::ModelNotReady)?;
    let metadata = state.context.metadata().ok_or(AppError::ModelNotReady)?;

    Ok(Json(ModelInfoResponse {
        info,
        metadata,
        engine_status: state.context.status(),
    }))
}
