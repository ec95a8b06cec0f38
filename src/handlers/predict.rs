//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, AppResult};
use crate::models::{FeatureRecord, ModelInfo, PredictResponse};

/// Run the pipeline on a JSON record
pub async fn predict(
    State(state): State<AppState>,
    req: Result<Json<FeatureRecord>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(req) = req?;
    req.validate()?;

    let request_id = Uuid::new_v4();
    let _span = tracing::info_span!("predict", %request_id).entered();

    let prediction = state.pipeline.run(&req)?;
    tracing::info!("Predicted addiction level: {}", prediction.addiction_level);

    Ok(Json(PredictResponse {
        request_id,
        class_index: prediction.class_index,
        addiction_level: prediction.addiction_level,
    }))
}

/// Describe the loaded artifacts
pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.model_info.as_ref().clone())
}
